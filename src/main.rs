//! Book Service - Main entry point.

use book_service::config::Config;
use book_service::db::{self, BookRepository};
use book_service::server::HttpServer;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_tracing(&config);

    info!("Starting book service v{}", env!("CARGO_PKG_VERSION"));

    let db_config = config.parse_database()?;
    let pool = db::connect(
        &db_config,
        config.pool_settings(db_config.db_type),
        config.connect_timeout_duration(),
    )
    .await?;

    let books = BookRepository::new(pool, config.query_timeout_duration());
    let server = HttpServer::new(books, &config.http_host, config.http_port);

    if let Err(e) = server.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
