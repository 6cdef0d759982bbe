// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Book {
    pub title: String,
    pub pages: u32,
}

impl Book {
    pub fn new(title: impl Into<String>, pages: u32) -> Self {
        Self {
            title: title.into(),
            pages,
        }
    }
}

/// One page of books in server order.
pub type BookList = Vec<Book>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStatus {
    Created,
    Unchanged,
}

impl UpsertStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "OK",
            Self::Unchanged => "Not Modified",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCycle {
    Idle,
    CountPending,
    DataPending,
    Rendered,
    Failed,
}

impl LoadCycle {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CountPending => "counting",
            Self::DataPending => "loading",
            Self::Rendered => "ready",
            Self::Failed => "failed",
        }
    }

    pub const fn is_pending(self) -> bool {
        matches!(self, Self::CountPending | Self::DataPending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CycleToken(u64);

impl CycleToken {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Status indicator shown beside the upsert control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    Saving,
    Saved(UpsertStatus),
    Failed(String),
}

impl FormStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::Saving => "saving",
            Self::Saved(status) => status.as_str(),
            Self::Failed(_) => "Error",
        }
    }
}
