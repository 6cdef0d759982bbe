// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Book;

/// Projects a decoded page into view nodes.
pub trait ListRenderer {
    fn render(&mut self, books: &[Book]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryBlock {
    pub title: String,
    pub pages: String,
}

impl EntryBlock {
    pub fn for_book(book: &Book) -> Self {
        Self {
            title: format!("title: {}", book.title),
            pages: format!("pages: {}", book.pages),
        }
    }
}

/// Replaces every entry on each render. Pages are bounded, so no diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockListRenderer {
    entries: Vec<EntryBlock>,
    renders: usize,
}

impl BlockListRenderer {
    pub fn entries(&self) -> &[EntryBlock] {
        &self.entries
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}\n{}\n", entry.title, entry.pages))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ListRenderer for BlockListRenderer {
    fn render(&mut self, books: &[Book]) {
        self.entries.clear();
        self.entries.extend(books.iter().map(EntryBlock::for_book));
        self.renders += 1;
    }
}
