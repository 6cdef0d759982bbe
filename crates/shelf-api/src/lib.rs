// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod proto;

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use shelf_app::{Book, BookApi, BookList, ShelfError, UpsertRequest, UpsertStatus};
use std::time::Duration;
use url::Url;

pub use proto::{decode_list, decode_one, encode_list, encode_one};

/// Blocking client for the shelf HTTP API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let mut base_url =
            Url::parse(trimmed).with_context(|| format!("parse server URL {trimmed:?}"))?;
        if base_url.cannot_be_a_base() {
            bail!("server URL {trimmed:?} cannot carry API paths; use http://host:port");
        }
        base_url.set_query(None);
        base_url.set_fragment(None);

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn page_count_url(&self) -> Url {
        self.endpoint(&["api", "books", "pagination"])
    }

    pub fn page_url(&self, index: u32) -> Url {
        let mut url = self.endpoint(&["api", "books"]);
        url.query_pairs_mut().append_pair("i", &index.to_string());
        url
    }

    pub fn upsert_url(&self, request: &UpsertRequest) -> Url {
        self.endpoint(&[
            "api",
            "book",
            &format!("title-{}", request.title),
            &request.pages.to_string(),
        ])
    }

    pub fn sort_url(&self) -> Url {
        self.endpoint(&["api", "books", "sort"])
    }

    pub fn lookup_url(&self, title: &str) -> Url {
        self.endpoint(&["api", "book", title])
    }

    fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, ShelfError> {
        tracing::debug!(%url, "send request");
        request
            .send()
            .map_err(|error| connection_error(url, &error))
    }
}

impl BookApi for Client {
    fn load_page_count(&self) -> Result<u32, ShelfError> {
        let url = self.page_count_url();
        let response = self.send(self.http.get(url.clone()), &url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(request_error(status));
        }

        let body = response
            .text()
            .map_err(|error| connection_error(&url, &error))?;
        body.trim()
            .parse::<u32>()
            .map_err(|error| ShelfError::Parse {
                body: body.clone(),
                message: error.to_string(),
            })
    }

    fn load_page(&self, index: u32) -> Result<BookList, ShelfError> {
        let url = self.page_url(index);
        let response = self.send(self.http.get(url.clone()), &url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(request_error(status));
        }

        let bytes = response
            .bytes()
            .map_err(|error| connection_error(&url, &error))?;
        decode_list(&bytes)
    }

    fn upsert(&self, request: &UpsertRequest) -> Result<UpsertStatus, ShelfError> {
        let url = self.upsert_url(request);
        let response = self.send(self.http.put(url.clone()), &url)?;
        match response.status() {
            StatusCode::OK => Ok(UpsertStatus::Created),
            StatusCode::NOT_MODIFIED => Ok(UpsertStatus::Unchanged),
            status => Err(request_error(status)),
        }
    }

    fn trigger_sort(&self) -> Result<(), ShelfError> {
        let url = self.sort_url();
        let response = self.send(self.http.patch(url.clone()), &url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(request_error(status));
        }
        Ok(())
    }

    fn lookup(&self, title: &str) -> Result<Option<Book>, ShelfError> {
        let url = self.lookup_url(title);
        let response = self.send(self.http.get(url.clone()), &url)?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::OK => {
                let bytes = response
                    .bytes()
                    .map_err(|error| connection_error(&url, &error))?;
                decode_one(&bytes).map(Some)
            }
            status => Err(request_error(status)),
        }
    }
}

fn connection_error(url: &Url, error: &reqwest::Error) -> ShelfError {
    ShelfError::Network {
        url: url.to_string(),
        message: error.to_string(),
    }
}

fn request_error(status: StatusCode) -> ShelfError {
    ShelfError::Request {
        status: status.as_u16(),
        status_text: status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::Client;
    use anyhow::Result;
    use shelf_app::UpsertRequest;
    use std::time::Duration;

    fn client(base: &str) -> Result<Client> {
        Client::new(base, Duration::from_secs(1))
    }

    #[test]
    fn endpoints_follow_api_layout() -> Result<()> {
        let client = client("http://localhost:3000/?i=4#top")?;
        assert_eq!(
            client.page_count_url().as_str(),
            "http://localhost:3000/api/books/pagination"
        );
        assert_eq!(
            client.page_url(3).as_str(),
            "http://localhost:3000/api/books?i=3"
        );
        assert_eq!(
            client.sort_url().as_str(),
            "http://localhost:3000/api/books/sort"
        );
        Ok(())
    }

    #[test]
    fn upsert_url_encodes_title_segment() -> Result<()> {
        let client = client("http://localhost:3000")?;
        let url = client.upsert_url(&UpsertRequest {
            title: "war & peace/2".to_owned(),
            pages: 1225,
        });
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/book/title-war%20&%20peace%2F2/1225"
        );
        Ok(())
    }

    #[test]
    fn base_path_prefix_is_kept() -> Result<()> {
        let client = client("http://localhost:3000/shelf/")?;
        assert_eq!(
            client.lookup_url("title-1").as_str(),
            "http://localhost:3000/shelf/api/book/title-1"
        );
        Ok(())
    }

    #[test]
    fn rejects_empty_and_opaque_urls() {
        assert!(client("  ").is_err());
        let error = client("mailto:shelf@example.com").expect_err("opaque URL should fail");
        assert!(error.to_string().contains("cannot carry API paths"));
    }
}
