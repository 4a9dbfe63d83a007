//! WooCommerce Connector - Worker Binary
//!
//! Runs the export jobs and periodically synchronizes the countries flagged
//! for export.
//!
//! # Environment Variables
//!
//! * `WOO_DATABASE_URL` - PostgreSQL connection string
//! * `WOO_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `WOO_SYNC_INTERVAL_SECS` - Seconds between synchronizations (default: 300)
//! * `WOO_POLL_INTERVAL_MS` - Job channel poll interval (default: 1000)
//! * `WOO_MAX_RETRIES` - Attempts per job (default: 5)
//! * `WOO_HTTP_TIMEOUT_SECS` - WooCommerce request timeout (default: 30)

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use validator::Validate;

use domain_woo::ConnectorPorts;
use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresConnectorAdapter};
use interface_worker::{config::WorkerConfig, init_tracing, Worker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env().context("failed to load WOO_* configuration")?;
    config.validate().context("invalid worker configuration")?;

    init_tracing(&config.log_level);
    tracing::info!("Starting WooCommerce connector worker");

    let pool = create_pool(DatabaseConfig::new(&config.database_url)).await?;
    run_migrations(&pool).await?;

    let adapter = Arc::new(PostgresConnectorAdapter::new(pool));
    let worker = Worker::new(ConnectorPorts::from_store(adapter), &config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    worker.run(shutdown_rx).await;

    tracing::info!("Worker shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
