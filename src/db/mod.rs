//! Database abstraction layer.
//!
//! - Connection pool creation for MySQL, PostgreSQL and SQLite
//! - Book insert and lookup
//! - Database dispatch macro

pub mod books;
pub mod macros;
pub mod pool;

pub use books::BookRepository;
pub use pool::{DbPool, connect};
