//! Book persistence.
//!
//! `BookRepository` runs the two statements the service needs (insert one
//! book, fetch one book by id) against whichever backend the pool targets.
//! Each call acquires a pooled connection, runs a single parameterized
//! statement under the query timeout, and returns the connection to the pool
//! when the call ends.
//!
//! Expected table layout (names are fixed, types per backend):
//!
//! ```text
//! book(id BIGINT PK auto-assigned, title, author, publisher,
//!      publication_year INT, content TEXT, summary TEXT)
//! ```

use crate::db::pool::DbPool;
use crate::error::{BookError, BookResult};
use crate::models::{Book, NewBook, decode_content};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Row shape shared by every backend.
#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    publisher: String,
    publication_year: i32,
    content: String,
    summary: String,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: Some(row.id),
            title: row.title,
            author: row.author,
            publisher: row.publisher,
            publication_year: row.publication_year,
            content: decode_content(&row.content),
            summary: row.summary,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: DbPool,
    query_timeout: Duration,
}

impl BookRepository {
    pub fn new(pool: DbPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Insert a book and return it with the id the database assigned.
    pub async fn create(&self, book: NewBook) -> BookResult<Book> {
        debug!(
            db_type = %self.pool.db_type(),
            title = %book.title,
            pages = book.content.len(),
            "Inserting book"
        );

        let id = match &self.pool {
            DbPool::MySql(p) => mysql::insert(p, &book, self.query_timeout).await?,
            DbPool::Postgres(p) => postgres::insert(p, &book, self.query_timeout).await?,
            DbPool::SQLite(p) => sqlite::insert(p, &book, self.query_timeout).await?,
        };

        Ok(book.into_book(id))
    }

    /// Fetch a book by primary key.
    ///
    /// Returns `BookError::NotFound` when no row has this id.
    pub async fn get(&self, id: i64) -> BookResult<Book> {
        debug!(db_type = %self.pool.db_type(), id, "Fetching book");

        let row = match &self.pool {
            DbPool::MySql(p) => mysql::fetch(p, id, self.query_timeout).await?,
            DbPool::Postgres(p) => postgres::fetch(p, id, self.query_timeout).await?,
            DbPool::SQLite(p) => sqlite::fetch(p, id, self.query_timeout).await?,
        };

        row.map(Book::from).ok_or_else(|| BookError::not_found(id))
    }
}

/// Await a database future, failing with `BookError::Timeout` after `limit`.
async fn with_timeout<T, F>(operation: &str, limit: Duration, fut: F) -> BookResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result.map_err(BookError::from),
        Err(_) => Err(BookError::timeout(operation, limit.as_secs())),
    }
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================
//
// Each module below provides the same interface adapted to its database type.
// MySQL and SQLite use `?` placeholders and report the new id on the query
// result; PostgreSQL uses `$n` placeholders and `RETURNING id`.

const SELECT_COLUMNS: &str =
    "SELECT id, title, author, publisher, publication_year, content, summary FROM book";

mod mysql {
    use super::*;
    use sqlx::MySqlPool;

    const INSERT_SQL: &str = "INSERT INTO book (title, author, publisher, publication_year, content, summary) VALUES (?, ?, ?, ?, ?, ?)";

    pub(super) async fn insert(pool: &MySqlPool, book: &NewBook, limit: Duration) -> BookResult<i64> {
        let content = book.encoded_content();
        let result = with_timeout("insert book", limit, async {
            let mut conn = pool.acquire().await?;
            sqlx::query(INSERT_SQL)
                .bind(book.title.as_str())
                .bind(book.author.as_str())
                .bind(book.publisher.as_str())
                .bind(book.publication_year)
                .bind(content.as_str())
                .bind(book.summary.as_str())
                .execute(&mut *conn)
                .await
        })
        .await?;

        i64::try_from(result.last_insert_id())
            .map_err(|_| BookError::internal("Assigned id does not fit in a signed 64-bit integer"))
    }

    pub(super) async fn fetch(pool: &MySqlPool, id: i64, limit: Duration) -> BookResult<Option<BookRow>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        with_timeout("fetch book", limit, async {
            let mut conn = pool.acquire().await?;
            sqlx::query_as::<_, BookRow>(&sql)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await
        })
        .await
    }
}

mod postgres {
    use super::*;
    use sqlx::PgPool;

    const INSERT_SQL: &str = "INSERT INTO book (title, author, publisher, publication_year, content, summary) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id";

    pub(super) async fn insert(pool: &PgPool, book: &NewBook, limit: Duration) -> BookResult<i64> {
        let content = book.encoded_content();
        with_timeout("insert book", limit, async {
            let mut conn = pool.acquire().await?;
            sqlx::query_scalar::<_, i64>(INSERT_SQL)
                .bind(book.title.as_str())
                .bind(book.author.as_str())
                .bind(book.publisher.as_str())
                .bind(book.publication_year)
                .bind(content.as_str())
                .bind(book.summary.as_str())
                .fetch_one(&mut *conn)
                .await
        })
        .await
    }

    pub(super) async fn fetch(pool: &PgPool, id: i64, limit: Duration) -> BookResult<Option<BookRow>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        with_timeout("fetch book", limit, async {
            let mut conn = pool.acquire().await?;
            sqlx::query_as::<_, BookRow>(&sql)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await
        })
        .await
    }
}

mod sqlite {
    use super::*;
    use sqlx::SqlitePool;

    const INSERT_SQL: &str = "INSERT INTO book (title, author, publisher, publication_year, content, summary) VALUES (?, ?, ?, ?, ?, ?)";

    pub(super) async fn insert(pool: &SqlitePool, book: &NewBook, limit: Duration) -> BookResult<i64> {
        let content = book.encoded_content();
        let result = with_timeout("insert book", limit, async {
            let mut conn = pool.acquire().await?;
            sqlx::query(INSERT_SQL)
                .bind(book.title.as_str())
                .bind(book.author.as_str())
                .bind(book.publisher.as_str())
                .bind(book.publication_year)
                .bind(content.as_str())
                .bind(book.summary.as_str())
                .execute(&mut *conn)
                .await
        })
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub(super) async fn fetch(pool: &SqlitePool, id: i64, limit: Duration) -> BookResult<Option<BookRow>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        with_timeout("fetch book", limit, async {
            let mut conn = pool.acquire().await?;
            sqlx::query_as::<_, BookRow>(&sql)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_repository(with_table: bool) -> BookRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        if with_table {
            sqlx::query(
                "CREATE TABLE book (id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT NOT NULL, \
                 author TEXT NOT NULL, publisher TEXT NOT NULL, publication_year INTEGER NOT NULL, \
                 content TEXT NOT NULL, summary TEXT NOT NULL)",
            )
            .execute(&pool)
            .await
            .unwrap();
        }
        BookRepository::new(pool.into(), Duration::from_secs(5))
    }

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Pramoedya Ananta Toer".to_string(),
            publisher: "Hasta Mitra".to_string(),
            publication_year: 1980,
            content: vec!["page one".to_string(), "page two".to_string()],
            summary: "Minke in colonial Java".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let repo = memory_repository(true).await;
        let first = repo.create(new_book("Bumi Manusia")).await.unwrap();
        let second = repo.create(new_book("Anak Semua Bangsa")).await.unwrap();

        assert!(first.id.is_some());
        assert!(second.id.is_some());
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_get_returns_created_book() {
        let repo = memory_repository(true).await;
        let created = repo.create(new_book("Bumi Manusia")).await.unwrap();
        let id = created.id.unwrap();

        let fetched = repo.get(id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.content, vec!["page one", "page two"]);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = memory_repository(true).await;
        let err = repo.get(404).await.unwrap_err();
        assert!(matches!(err, BookError::NotFound { id: 404 }));
    }

    #[tokio::test]
    async fn test_missing_table_is_database_error() {
        let repo = memory_repository(false).await;
        let err = repo.create(new_book("Bumi Manusia")).await.unwrap_err();
        assert!(matches!(err, BookError::Database { .. }));
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn test_closed_pool_is_internal_error() {
        let repo = memory_repository(true).await;
        repo.pool().close().await;
        let err = repo.get(1).await.unwrap_err();
        assert!(matches!(err, BookError::Connection { .. }));
    }
}
