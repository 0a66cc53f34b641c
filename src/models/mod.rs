//! Data models for the book service.

pub mod book;
pub mod connection;

pub use book::{
    Book, NewBook, PageRangeError, ValidationError, decode_content, encode_content, read_pages,
};
pub use connection::DatabaseType;
