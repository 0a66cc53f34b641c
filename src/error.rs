//! Error types for the book service.
//!
//! `BookError` covers every failure a request can hit. Its `IntoResponse`
//! impl decides the HTTP status; persistence details are logged and never
//! sent to the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum BookError {
    /// Request could not be decoded (bad JSON, wrong types, bad path).
    #[error("Invalid input: {message}")]
    InvalidInput { message: String, status: StatusCode },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Book {id} not found")]
    NotFound { id: i64 },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
    },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BookError {
    pub fn invalid_input(message: impl Into<String>, status: StatusCode) -> Self {
        Self::InvalidInput {
            message: message.into(),
            status,
        }
    }

    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { status, .. } => *status,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Connection { .. }
            | Self::Database { .. }
            | Self::Timeout { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            _ => "internal_error",
        }
    }

    /// True for failures caused by the server side rather than the request.
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

/// Convert sqlx errors to BookError.
impl From<sqlx::Error> for BookError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => BookError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                BookError::database(db_err.message(), code)
            }
            sqlx::Error::RowNotFound => BookError::database("No rows returned", None),
            sqlx::Error::PoolTimedOut => BookError::connection(
                "Timed out waiting for a pooled connection",
                "Raise --max-connections or --acquire-timeout",
            ),
            sqlx::Error::PoolClosed => {
                BookError::connection("Connection pool is closed", "Restart the service")
            }
            sqlx::Error::Io(io_err) => BookError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => BookError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => BookError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                BookError::database(format!("Column not found: {}", col), None)
            }
            sqlx::Error::ColumnDecode { index, source } => {
                BookError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => BookError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => BookError::internal("Database worker crashed"),
            _ => BookError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for book operations.
pub type BookResult<T> = Result<T, BookError>;

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for BookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if self.is_internal() {
            tracing::error!(error = %self, suggestion = ?self.suggestion(), "Request failed");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}
