// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use url::Url;

use crate::pagination::parse_index;

pub const PAGE_QUERY_KEY: &str = "i";

/// Document URL that persists the current page index in its `i` query pair.
///
/// Writes replace the pair in place; there is no history to push onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw).map(Self::new)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn raw_page_index(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == PAGE_QUERY_KEY)
            .map(|(_, value)| value.into_owned())
    }

    /// Page index requested by the URL, or `None` when the pair is missing or
    /// not an integer.
    pub fn page_index(&self) -> Option<i64> {
        self.raw_page_index().as_deref().and_then(parse_index)
    }

    /// Rewrites the `i` pair, keeping every other query pair in order.
    pub fn replace_page_index(&mut self, index: u32) {
        let others: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(key, _)| key != PAGE_QUERY_KEY)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let value = index.to_string();
        let mut pairs = self.url.query_pairs_mut();
        pairs.clear();
        for (key, existing) in &others {
            pairs.append_pair(key, existing);
        }
        pairs.append_pair(PAGE_QUERY_KEY, &value);
    }
}
