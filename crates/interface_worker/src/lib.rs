//! Worker Layer
//!
//! Wires the connector together and runs it:
//!
//! - **Config**: `WorkerConfig` from `WOO_*` environment variables
//! - **Wiring**: environment, job and action registries, queue and runner
//! - **Loops**: the job runner on `root.woo` and the periodic synchronization
//!   of countries flagged for export
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_worker::{Worker, config::WorkerConfig};
//!
//! let worker = Worker::new(ports, &config);
//! worker.run(shutdown_rx).await;
//! ```

pub mod config;
pub mod error;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{ActionRegistry, JobId, JobQueue, JobRegistry};
use domain_woo::{
    register_actions, register_jobs, ConnectorEnvironment, ConnectorPorts, RestTransportFactory,
    ShippingZoneService, TransportFactory, WOO_CHANNEL,
};
use infra_queue::{InMemoryJobQueue, JobRunner, RunnerConfig};

use crate::config::WorkerConfig;
pub use crate::error::WorkerError;

/// Everything the worker process runs
pub struct Worker {
    env: Arc<ConnectorEnvironment>,
    queue: Arc<dyn JobQueue>,
    actions: Arc<ActionRegistry>,
    service: ShippingZoneService,
    runner: JobRunner,
    config: WorkerConfig,
}

impl Worker {
    /// Builds a worker talking to WooCommerce over REST
    pub fn new(ports: ConnectorPorts, config: &WorkerConfig) -> Self {
        let transports = Arc::new(RestTransportFactory::new(config.http_timeout()));
        let queue = Arc::new(InMemoryJobQueue::with_finished_capacity(config.finished_jobs_kept));
        Self::with_transports(ports, transports, queue, config)
    }

    pub fn with_transports(
        ports: ConnectorPorts,
        transports: Arc<dyn TransportFactory>,
        queue: Arc<dyn JobQueue>,
        config: &WorkerConfig,
    ) -> Self {
        let env = Arc::new(ConnectorEnvironment::new(ports, transports));

        let mut jobs = JobRegistry::new();
        register_jobs(&mut jobs, env.clone());
        let jobs = Arc::new(jobs);

        let mut actions = ActionRegistry::new();
        register_actions(&mut actions, env.clone());

        let service = ShippingZoneService::new(env.clone(), queue.clone(), jobs.clone());
        let runner = JobRunner::new(
            queue.clone(),
            jobs,
            RunnerConfig {
                max_retries: config.max_retries,
                poll_interval: config.poll_interval(),
                retry_backoff: config.retry_backoff(),
                max_retry_backoff: config.max_retry_backoff(),
            },
        );

        Self {
            env,
            queue,
            actions: Arc::new(actions),
            service,
            runner,
            config: config.clone(),
        }
    }

    pub fn service(&self) -> &ShippingZoneService {
        &self.service
    }

    pub fn runner(&self) -> &JobRunner {
        &self.runner
    }

    pub fn queue(&self) -> &Arc<dyn JobQueue> {
        &self.queue
    }

    pub fn actions(&self) -> &Arc<ActionRegistry> {
        &self.actions
    }

    /// Queues exports for the flagged countries of every backend
    ///
    /// A failing backend is logged and skipped.
    #[instrument(skip(self))]
    pub async fn sync_all_backends(&self) -> Result<Vec<JobId>, WorkerError> {
        let backends = self.env.ports().backends.list_backends().await?;

        let mut queued = Vec::new();
        for backend in backends {
            match self.service.sync_marked_countries(backend.id).await {
                Ok(ids) => queued.extend(ids),
                Err(e) => error!(backend = %backend.name, error = %e, "Synchronization failed"),
            }
        }
        Ok(queued)
    }

    /// Runs the job runner and the synchronization loop until `shutdown`
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        info!(
            sync_interval_secs = self.config.sync_interval_secs,
            "Starting WooCommerce worker"
        );

        tokio::join!(
            self.runner.run_until_shutdown(WOO_CHANNEL, shutdown.clone()),
            self.sync_loop(shutdown),
        );

        info!("Worker stopped");
    }

    async fn sync_loop(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.config.sync_interval());
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sync_all_backends().await {
                        error!(error = %e, "Failed to list backends");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

/// Initializes the tracing subscriber for structured logging
///
/// `RUST_LOG` takes precedence over `log_level`.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
