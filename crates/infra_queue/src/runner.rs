//! Job runner
//!
//! Pops jobs from one channel and runs them through the handlers of a
//! `JobRegistry`. A job is attempted at most `max_retries` times. A
//! retryable failure puts it back on its channel with an `eta` that grows
//! exponentially with each attempt; a permanent failure fails it at once.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, error, info, instrument, warn};

use core_kernel::{Job, JobError, JobQueue, JobRegistry, JobState, PortError};

/// Attempts per job unless the job overrides it
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Delay before the first retry
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(10);

/// Upper bound of the retry delay
pub const DEFAULT_MAX_RETRY_BACKOFF: Duration = Duration::from_secs(3600);

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Attempts per job unless `Job::max_retries` is set
    pub max_retries: u32,

    /// How often to poll the channel
    pub poll_interval: Duration,

    /// Delay before the first retry, doubled on each further attempt
    pub retry_backoff: Duration,

    pub max_retry_backoff: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            poll_interval: Duration::from_millis(1000),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            max_retry_backoff: DEFAULT_MAX_RETRY_BACKOFF,
        }
    }
}

impl RunnerConfig {
    /// Delay after the failed attempt number `attempt` (1-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_backoff
            .saturating_mul(factor)
            .min(self.max_retry_backoff)
    }

    /// When a job that just failed attempt `attempt` may run again
    pub fn retry_eta(&self, attempt: u32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        chrono::Duration::from_std(self.retry_delay(attempt))
            .ok()
            .and_then(|delay| now.checked_add_signed(delay))
    }
}

/// Executes queued jobs
pub struct JobRunner {
    queue: Arc<dyn JobQueue>,
    registry: Arc<JobRegistry>,
    config: RunnerConfig,
}

impl JobRunner {
    pub fn new(queue: Arc<dyn JobQueue>, registry: Arc<JobRegistry>, config: RunnerConfig) -> Self {
        Self {
            queue,
            registry,
            config,
        }
    }

    /// Runs the oldest due job of `channel`
    ///
    /// Returns the job in its new state, or `None` when the channel is
    /// empty. Handler failures are recorded on the job; only queue
    /// failures are returned as errors.
    #[instrument(skip(self))]
    pub async fn run_once(&self, channel: &str) -> Result<Option<Job>, PortError> {
        let Some(mut job) = self.queue.dequeue(channel).await? else {
            return Ok(None);
        };
        job.attempts += 1;
        let max_retries = job.max_retries.unwrap_or(self.config.max_retries);

        let outcome = match self.registry.handler(&job.name) {
            Some(handler) => handler.perform(&job.payload).await,
            None => Err(JobError::permanent(format!(
                "no handler registered for {}",
                job.name
            ))),
        };

        match outcome {
            Ok(result) => {
                job.state = JobState::Done;
                job.result = Some(result);
                job.exc_info = None;
                job.eta = None;
                job.date_done = Some(Utc::now());
                debug!(job_id = %job.id, name = %job.name, attempts = job.attempts, "Job done");
            }
            Err(e) if e.retryable && job.attempts < max_retries => {
                job.state = JobState::Pending;
                job.exc_info = Some(e.message);
                job.eta = self.config.retry_eta(job.attempts, Utc::now());
                warn!(
                    job_id = %job.id,
                    name = %job.name,
                    attempts = job.attempts,
                    max_retries,
                    retry_in_ms = self.config.retry_delay(job.attempts).as_millis() as u64,
                    error = job.exc_info.as_deref().unwrap_or_default(),
                    "Job failed, will retry"
                );
            }
            Err(e) => {
                job.state = JobState::Failed;
                job.exc_info = Some(e.message);
                job.date_done = Some(Utc::now());
                error!(
                    job_id = %job.id,
                    name = %job.name,
                    attempts = job.attempts,
                    error = job.exc_info.as_deref().unwrap_or_default(),
                    "Job failed"
                );
            }
        }

        self.queue.update(&job).await?;
        Ok(Some(job))
    }

    /// Runs `channel` until it has no due job left
    ///
    /// A retried job runs again in the same call only once its `eta` has
    /// passed. Returns every job that reached `Done` or `Failed`.
    pub async fn drain(&self, channel: &str) -> Result<Vec<Job>, PortError> {
        let mut finished = Vec::new();
        while let Some(job) = self.run_once(channel).await? {
            if job.is_finished() {
                finished.push(job);
            }
        }
        Ok(finished)
    }

    /// Polls `channel` until `shutdown` turns true
    pub async fn run_until_shutdown(&self, channel: &str, mut shutdown: watch::Receiver<bool>) {
        info!(
            channel,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            max_retries = self.config.max_retries,
            "Starting job runner"
        );
        let mut poll_interval = interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    if let Err(e) = self.drain(channel).await {
                        error!(channel, error = %e, "Failed to run queued jobs");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(channel, "Job runner stopped");
    }
}
