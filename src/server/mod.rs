//! HTTP server for the book service.

pub mod routes;

pub use routes::{AppState, router};

use crate::db::BookRepository;
use crate::error::{BookError, BookResult};
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

/// Time allowed for in-flight requests after a shutdown signal.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpServer {
    books: BookRepository,
    host: String,
    port: u16,
}

impl HttpServer {
    pub fn new(books: BookRepository, host: impl Into<String>, port: u16) -> Self {
        Self {
            books,
            host: host.into(),
            port,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Serve until SIGINT/SIGTERM, then close the database pool.
    pub async fn run(&self) -> BookResult<()> {
        let bind_addr = self.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            BookError::connection(
                format!("Failed to bind to {}: {}", bind_addr, e),
                "Check that the port is available",
            )
        })?;
        info!(addr = %bind_addr, "Listening for HTTP requests");

        self.serve(listener).await
    }

    /// Serve on an already-bound listener.
    ///
    /// The first signal stops accepting connections and lets in-flight
    /// requests finish for up to `GRACEFUL_TIMEOUT`; a second signal drops
    /// them. The pool is closed on every exit path.
    pub async fn serve(&self, listener: TcpListener) -> BookResult<()> {
        let app = router(AppState::new(self.books.clone()));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop_rx.await;
                })
                .await
        });

        let finished = tokio::select! {
            joined = &mut server => Some(joined),
            _ = wait_for_signal() => None,
        };
        let joined = match finished {
            Some(joined) => joined,
            None => {
                let _ = stop_tx.send(());
                info!(
                    grace_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Draining in-flight requests; signal again to drop them"
                );
                drain(server).await
            }
        };

        let outcome = match joined {
            Ok(Ok(())) => {
                info!("HTTP server stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(BookError::internal(format!("HTTP server error: {}", e))),
            Err(e) => Err(BookError::internal(format!("HTTP server task failed: {}", e))),
        };
        if let Err(e) = &outcome {
            error!(error = %e, "HTTP server exited abnormally");
        }

        info!("Closing database connections");
        self.books.pool().close().await;

        outcome
    }
}

/// Wait for a stopping server task, aborting it on timeout or a second signal.
async fn drain(mut server: JoinHandle<io::Result<()>>) -> Result<io::Result<()>, JoinError> {
    let reason = tokio::select! {
        joined = &mut server => return joined,
        _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => "grace period elapsed",
        _ = wait_for_signal() => "second signal received",
    };
    warn!(reason, "Dropping in-flight requests");
    server.abort();
    Ok(Ok(()))
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
