//! Worker error handling

use thiserror::Error;

use core_kernel::PortError;
use domain_woo::ConnectorError;
use infra_db::DatabaseError;

/// Errors raised while starting or running the worker
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Storage error: {0}")]
    Port(#[from] PortError),

    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),
}
