// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Wire messages for the `book` protobuf package.
//!
//! ```proto
//! message Book { string title = 1; uint32 pages = 2; }
//! message Books { repeated Book books = 1; }
//! ```

use prost::Message;
use shelf_app::{Book, BookList, ShelfError};

#[derive(Clone, PartialEq, Message)]
pub struct BookMessage {
    #[prost(string, tag = "1")]
    pub title: String,
    #[prost(uint32, tag = "2")]
    pub pages: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct BooksMessage {
    #[prost(message, repeated, tag = "1")]
    pub books: Vec<BookMessage>,
}

impl TryFrom<BookMessage> for Book {
    type Error = ShelfError;

    fn try_from(message: BookMessage) -> Result<Self, Self::Error> {
        if message.title.is_empty() {
            return Err(ShelfError::Decode {
                message: "book without a title".to_owned(),
            });
        }
        Ok(Book {
            title: message.title,
            pages: message.pages,
        })
    }
}

impl From<&Book> for BookMessage {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            pages: book.pages,
        }
    }
}

pub fn decode_list(bytes: &[u8]) -> Result<BookList, ShelfError> {
    let message = BooksMessage::decode(bytes).map_err(decode_error)?;
    message.books.into_iter().map(Book::try_from).collect()
}

pub fn decode_one(bytes: &[u8]) -> Result<Book, ShelfError> {
    BookMessage::decode(bytes)
        .map_err(decode_error)
        .and_then(Book::try_from)
}

pub fn encode_list(books: &[Book]) -> Vec<u8> {
    BooksMessage {
        books: books.iter().map(BookMessage::from).collect(),
    }
    .encode_to_vec()
}

pub fn encode_one(book: &Book) -> Vec<u8> {
    BookMessage::from(book).encode_to_vec()
}

fn decode_error(error: prost::DecodeError) -> ShelfError {
    ShelfError::Decode {
        message: error.to_string(),
    }
}
