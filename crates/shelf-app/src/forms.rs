// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ShelfError;

/// Raw text from the upsert form fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpsertForm {
    pub title: String,
    pub pages: String,
}

impl UpsertForm {
    pub fn new(title: impl Into<String>, pages: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: pages.into(),
        }
    }

    pub fn validate(&self) -> Result<UpsertRequest, ShelfError> {
        if self.title.is_empty() {
            return Err(ShelfError::validation(
                "title is required -- enter a title and retry",
            ));
        }

        let pages = self.pages.trim();
        if pages.is_empty() {
            return Err(ShelfError::validation(
                "pages is required -- enter a page count and retry",
            ));
        }
        if pages.starts_with('-') {
            return Err(ShelfError::validation("pages cannot be negative"));
        }
        let pages = pages.parse::<u32>().map_err(|_| {
            ShelfError::validation(format!(
                "pages must be a whole number, got {:?}",
                self.pages
            ))
        })?;

        Ok(UpsertRequest {
            title: self.title.clone(),
            pages,
        })
    }
}

/// Validated upsert input. Only constructed through [`UpsertForm::validate`]
/// or directly by trusted callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertRequest {
    pub title: String,
    pub pages: u32,
}
