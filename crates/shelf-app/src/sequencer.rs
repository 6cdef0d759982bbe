// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    AppEvent, AppState, Book, BookList, CycleToken, ListRenderer, ShelfError, UpsertRequest,
    UpsertStatus,
};

/// Transport to the shelf service. Implementations block until the response
/// body has been read and decoded.
pub trait BookApi {
    fn load_page_count(&self) -> Result<u32, ShelfError>;
    fn load_page(&self, index: u32) -> Result<BookList, ShelfError>;
    fn upsert(&self, request: &UpsertRequest) -> Result<UpsertStatus, ShelfError>;
    fn trigger_sort(&self) -> Result<(), ShelfError>;
    fn lookup(&self, title: &str) -> Result<Option<Book>, ShelfError>;
}

impl<T: BookApi + ?Sized> BookApi for Arc<T> {
    fn load_page_count(&self) -> Result<u32, ShelfError> {
        (**self).load_page_count()
    }

    fn load_page(&self, index: u32) -> Result<BookList, ShelfError> {
        (**self).load_page(index)
    }

    fn upsert(&self, request: &UpsertRequest) -> Result<UpsertStatus, ShelfError> {
        (**self).upsert(request)
    }

    fn trigger_sort(&self) -> Result<(), ShelfError> {
        (**self).trigger_sort()
    }

    fn lookup(&self, title: &str) -> Result<Option<Book>, ShelfError> {
        (**self).lookup(title)
    }
}

/// Disables the upsert control while a save is in flight.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    busy: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn is_set(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Returns `None` while another guard is alive.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Clears the flag on drop, whatever way the request ended.
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl PartialEq for BusyGuard {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.busy, &other.busy)
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Debug, PartialEq)]
pub enum ApiRequest {
    PageCount {
        token: CycleToken,
    },
    Page {
        token: CycleToken,
        index: u32,
    },
    Upsert {
        request: UpsertRequest,
        guard: BusyGuard,
    },
    Sort,
}

impl ApiRequest {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PageCount { .. } => "page count",
            Self::Page { .. } => "page",
            Self::Upsert { .. } => "upsert",
            Self::Sort => "sort",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    PageCount {
        token: CycleToken,
        result: Result<u32, ShelfError>,
    },
    Page {
        token: CycleToken,
        index: u32,
        result: Result<BookList, ShelfError>,
    },
    Upsert {
        title: String,
        result: Result<UpsertStatus, ShelfError>,
    },
    Sort {
        result: Result<(), ShelfError>,
    },
}

/// Runs one request to completion. Failures become part of the completion,
/// never an early return.
pub fn execute<A: BookApi + ?Sized>(api: &A, request: ApiRequest) -> Completion {
    tracing::debug!(request = request.label(), "issue request");
    match request {
        ApiRequest::PageCount { token } => Completion::PageCount {
            token,
            result: api.load_page_count(),
        },
        ApiRequest::Page { token, index } => Completion::Page {
            token,
            index,
            result: api.load_page(index),
        },
        ApiRequest::Upsert { request, guard } => {
            let result = api.upsert(&request);
            drop(guard);
            Completion::Upsert {
                title: request.title,
                result,
            }
        }
        ApiRequest::Sort => Completion::Sort {
            result: api.trigger_sort(),
        },
    }
}

/// Executes issued requests in order on the calling thread, feeding each
/// completion back into `state`. Returns every non-request event observed.
pub fn drive<A, R>(
    state: &mut AppState,
    api: &A,
    renderer: &mut R,
    events: Vec<AppEvent>,
) -> Vec<AppEvent>
where
    A: BookApi + ?Sized,
    R: ListRenderer + ?Sized,
{
    let mut pending: VecDeque<AppEvent> = events.into();
    let mut observed = Vec::new();
    while let Some(event) = pending.pop_front() {
        match event {
            AppEvent::Request(request) => {
                let completion = execute(api, request);
                pending.extend(state.complete(completion, renderer));
            }
            other => observed.push(other),
        }
    }
    observed
}
