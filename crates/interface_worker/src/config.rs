//! Worker configuration

use std::time::Duration;

use serde::Deserialize;
use validator::Validate;

/// Environment variable prefix, e.g. `WOO_DATABASE_URL`
pub const ENV_PREFIX: &str = "WOO";

/// Worker configuration
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct WorkerConfig {
    /// Database URL
    #[validate(length(min = 1))]
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// Seconds between two synchronizations of flagged countries
    #[validate(range(min = 1))]
    pub sync_interval_secs: u64,
    /// Milliseconds between two polls of the job channel
    #[validate(range(min = 1))]
    pub poll_interval_ms: u64,
    /// Attempts per job
    #[validate(range(min = 1))]
    pub max_retries: u32,
    /// Delay before the first retry of a failed job, doubled per attempt
    pub retry_backoff_secs: u64,
    /// Upper bound of the retry delay
    #[validate(range(min = 1))]
    pub max_retry_backoff_secs: u64,
    /// Finished jobs kept in memory for inspection
    pub finished_jobs_kept: usize,
    /// Timeout of one WooCommerce request
    #[validate(range(min = 1))]
    pub http_timeout_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/woo_connector".to_string(),
            log_level: "info".to_string(),
            sync_interval_secs: 300,
            poll_interval_ms: 1000,
            max_retries: 5,
            retry_backoff_secs: 10,
            max_retry_backoff_secs: 3600,
            finished_jobs_kept: 1000,
            http_timeout_secs: 30,
        }
    }
}

impl WorkerConfig {
    /// Loads configuration from `WOO_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(None)
    }

    /// Loads configuration from the given variables instead of the process environment
    pub fn from_source(
        source: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(source),
            )
            .build()?
            .try_deserialize()
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }

    pub fn max_retry_backoff(&self) -> Duration {
        Duration::from_secs(self.max_retry_backoff_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
