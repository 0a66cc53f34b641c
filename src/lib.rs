//! Book Service Library
//!
//! A small HTTP service that stores book records in a SQL table
//! (MySQL, PostgreSQL or SQLite) and serves create and read operations.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;

pub use config::Config;
pub use error::{BookError, BookResult};
pub use server::{AppState, HttpServer, router};
