// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

/// Failures surfaced by the shelf service client and the upsert form.
///
/// Every variant carries owned text so completions can cross the worker
/// channel and be compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShelfError {
    #[error("{0}")]
    Validation(String),
    #[error("cannot reach {url} ({message})")]
    Network { url: String, message: String },
    #[error("request failed ({status}): {status_text}")]
    Request { status: u16, status_text: String },
    #[error("invalid page count {body:?}: {message}")]
    Parse { body: String, message: String },
    #[error("malformed books payload: {message}")]
    Decode { message: String },
}

impl ShelfError {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Network { .. } => "network",
            Self::Request { .. } => "request",
            Self::Parse { .. } => "parse",
            Self::Decode { .. } => "decode",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
