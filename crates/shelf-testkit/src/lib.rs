// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use shelf_app::{
    Book, BookApi, BookList, PAGE_SIZE, ShelfError, UpsertRequest, UpsertStatus, total_pages_for,
};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    PageCount,
    Page,
    Upsert,
    Sort,
    Lookup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    PageCount,
    Page(u32),
    Upsert { title: String, pages: u32 },
    Sort,
    Lookup(String),
}

impl ApiCall {
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::PageCount => Endpoint::PageCount,
            Self::Page(_) => Endpoint::Page,
            Self::Upsert { .. } => Endpoint::Upsert,
            Self::Sort => Endpoint::Sort,
            Self::Lookup(_) => Endpoint::Lookup,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    books: Vec<Book>,
    calls: Vec<ApiCall>,
    failures: VecDeque<(Endpoint, ShelfError)>,
}

/// In-memory stand-in for the shelf service: ten books per page, upsert
/// keyed by title, sort by the numeric suffix of `title-<n>`.
#[derive(Debug, Default)]
pub struct FakeShelf {
    inner: Mutex<Inner>,
}

impl FakeShelf {
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                books,
                ..Inner::default()
            }),
        }
    }

    /// `title-1` through `title-<count>`, pages equal to the suffix.
    pub fn seeded(count: u32) -> Self {
        Self::with_books(seed_books(count))
    }

    /// Fails the next call to `endpoint` with `error`. Failures queue in
    /// order and each is consumed once.
    pub fn fail_next(&self, endpoint: Endpoint, error: ShelfError) {
        self.lock().failures.push_back((endpoint, error));
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn books(&self) -> Vec<Book> {
        self.lock().books.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record(&self, call: ApiCall) -> Result<MutexGuard<'_, Inner>, ShelfError> {
        let mut inner = self.lock();
        let endpoint = call.endpoint();
        inner.calls.push(call);
        if let Some(position) = inner
            .failures
            .iter()
            .position(|(target, _)| *target == endpoint)
            && let Some((_, error)) = inner.failures.remove(position)
        {
            return Err(error);
        }
        Ok(inner)
    }
}

impl BookApi for FakeShelf {
    fn load_page_count(&self) -> Result<u32, ShelfError> {
        let inner = self.record(ApiCall::PageCount)?;
        Ok(total_pages_for(inner.books.len()))
    }

    fn load_page(&self, index: u32) -> Result<BookList, ShelfError> {
        let inner = self.record(ApiCall::Page(index))?;
        let skip = (index.max(1) as usize - 1).saturating_mul(PAGE_SIZE);
        Ok(inner
            .books
            .iter()
            .skip(skip)
            .take(PAGE_SIZE)
            .cloned()
            .collect())
    }

    fn upsert(&self, request: &UpsertRequest) -> Result<UpsertStatus, ShelfError> {
        let mut inner = self.record(ApiCall::Upsert {
            title: request.title.clone(),
            pages: request.pages,
        })?;
        let existing = inner
            .books
            .iter()
            .position(|book| book.title == request.title);
        match existing {
            Some(position) if inner.books[position].pages == request.pages => {
                Ok(UpsertStatus::Unchanged)
            }
            Some(position) => {
                inner.books[position].pages = request.pages;
                Ok(UpsertStatus::Created)
            }
            None => {
                inner
                    .books
                    .push(Book::new(request.title.clone(), request.pages));
                Ok(UpsertStatus::Created)
            }
        }
    }

    fn trigger_sort(&self) -> Result<(), ShelfError> {
        let mut inner = self.record(ApiCall::Sort)?;
        inner.books.sort_by_key(|book| title_suffix(&book.title));
        Ok(())
    }

    fn lookup(&self, title: &str) -> Result<Option<Book>, ShelfError> {
        let inner = self.record(ApiCall::Lookup(title.to_owned()))?;
        Ok(inner.books.iter().find(|book| book.title == title).cloned())
    }
}

fn title_suffix(title: &str) -> u32 {
    title
        .split('-')
        .nth(1)
        .and_then(|suffix| suffix.parse().ok())
        .unwrap_or(u32::MAX)
}

pub fn seed_books(count: u32) -> Vec<Book> {
    (1..=count)
        .map(|n| Book::new(format!("title-{n}"), n))
        .collect()
}

/// Seeded books in a deterministic shuffled order, for exercising sort.
pub fn shuffled_books(count: u32, seed: u64) -> Vec<Book> {
    let mut books = seed_books(count);
    let mut rng = DeterministicRng::new(seed);
    for i in (1..books.len()).rev() {
        let j = rng.int_n(i + 1);
        books.swap(i, j);
    }
    books
}

pub fn network_error() -> ShelfError {
    ShelfError::Network {
        url: "http://127.0.0.1:1".to_owned(),
        message: "connection refused".to_owned(),
    }
}

pub fn server_error() -> ShelfError {
    ShelfError::Request {
        status: 500,
        status_text: "Internal Server Error".to_owned(),
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiCall, Endpoint, FakeShelf, server_error, shuffled_books};
    use shelf_app::{Book, BookApi, ShelfError, UpsertRequest, UpsertStatus};

    #[test]
    fn pages_are_ten_books_wide() -> Result<(), ShelfError> {
        let shelf = FakeShelf::seeded(25);
        assert_eq!(shelf.load_page_count()?, 3);
        assert_eq!(shelf.load_page(1)?.len(), 10);
        assert_eq!(shelf.load_page(3)?.len(), 5);
        assert_eq!(shelf.load_page(3)?[0], Book::new("title-21", 21));
        assert!(shelf.load_page(4)?.is_empty());
        Ok(())
    }

    #[test]
    fn upsert_reports_unchanged_for_same_pages() -> Result<(), ShelfError> {
        let shelf = FakeShelf::seeded(3);
        let same = UpsertRequest {
            title: "title-2".to_owned(),
            pages: 2,
        };
        assert_eq!(shelf.upsert(&same)?, UpsertStatus::Unchanged);

        let changed = UpsertRequest {
            title: "title-2".to_owned(),
            pages: 20,
        };
        assert_eq!(shelf.upsert(&changed)?, UpsertStatus::Created);
        assert_eq!(shelf.lookup("title-2")?, Some(Book::new("title-2", 20)));
        Ok(())
    }

    #[test]
    fn sort_orders_by_title_suffix() -> Result<(), ShelfError> {
        let shelf = FakeShelf::with_books(shuffled_books(30, 4));
        shelf.trigger_sort()?;
        let titles: Vec<String> = shelf.books().into_iter().map(|book| book.title).collect();
        let expected: Vec<String> = (1..=30).map(|n| format!("title-{n}")).collect();
        assert_eq!(titles, expected);
        Ok(())
    }

    #[test]
    fn scripted_failure_is_consumed_once() {
        let shelf = FakeShelf::seeded(1);
        shelf.fail_next(Endpoint::Page, server_error());

        assert_eq!(shelf.load_page(1), Err(server_error()));
        assert!(shelf.load_page(1).is_ok());
        assert_eq!(shelf.calls(), vec![ApiCall::Page(1), ApiCall::Page(1)]);
    }

    #[test]
    fn shuffle_is_deterministic_and_complete() {
        let first = shuffled_books(12, 9);
        assert_eq!(first, shuffled_books(12, 9));
        let mut sorted = first.clone();
        sorted.sort_by_key(|book| book.pages);
        assert_eq!(sorted, super::seed_books(12));
    }
}
