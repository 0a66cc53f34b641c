//! HTTP routes for book records.
//!
//! - `POST /book/` creates a book and returns it with its new id
//! - `GET /book/{id}` returns one book

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::db::BookRepository;
use crate::error::{BookError, BookResult};
use crate::models::{Book, NewBook};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub books: BookRepository,
}

impl AppState {
    pub fn new(books: BookRepository) -> Self {
        Self { books }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/book/", post(create_book))
        .route("/book", post(create_book))
        .route("/book/{id}", get(read_book))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<Book>, JsonRejection>,
) -> BookResult<Json<Book>> {
    let Json(book) = payload
        .map_err(|rejection| BookError::invalid_input(rejection.body_text(), rejection.status()))?;

    info!(title = %book.title, author = %book.author, "Creating book");
    let new_book = NewBook::try_from(book)?;

    let created = state.books.create(new_book).await?;
    info!(id = ?created.id, "Book created");
    Ok(Json(created))
}

async fn read_book(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> BookResult<Json<Book>> {
    let Path(id) = id
        .map_err(|rejection| BookError::invalid_input(rejection.body_text(), rejection.status()))?;

    info!(id, "Reading book");
    let book = state.books.get(id).await.inspect_err(|e| {
        if matches!(e, BookError::NotFound { .. }) {
            warn!(id, "Book not found");
        }
    })?;
    Ok(Json(book))
}
