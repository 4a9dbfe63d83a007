//! Job and related-action registries
//!
//! Deferred work is described by a [`Job`]: the name of a registered
//! handler, the channel it runs on and a JSON payload. Handlers are
//! registered by name in a [`JobRegistry`]; the queue runtime (`infra_queue`)
//! pops jobs from a [`JobQueue`] and dispatches them through the registry.
//!
//! A job may also name a related action, a callback registered in the
//! [`ActionRegistry`] that tells an operator which record the job is about.
//!
//! ```rust,ignore
//! let mut jobs = JobRegistry::new();
//! jobs.register("woo.shipping.zone.export_record", "root.woo", Arc::new(handler));
//!
//! let job = jobs.delay("woo.shipping.zone.export_record", json!({"binding_id": id}))?
//!     .with_related_action("related_action_unwrap_binding");
//! queue.enqueue(job).await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::CoreError;
use crate::identifiers::JobId;
use crate::ports::PortError;

/// Root channel; every other channel is a child such as `root.woo`
pub const DEFAULT_CHANNEL: &str = "root";

/// Lifecycle of a queued job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Started,
    Done,
    Failed,
}

/// A unit of deferred work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Name of the handler in the `JobRegistry`
    pub name: String,
    pub channel: String,
    pub payload: Value,
    /// Name of the callback in the `ActionRegistry`
    pub related_action: Option<String>,
    pub state: JobState,
    /// Number of times the handler has been invoked
    pub attempts: u32,
    /// Overrides the runner's retry limit when set
    pub max_retries: Option<u32>,
    /// Earliest time the job may run; `None` means now
    pub eta: Option<DateTime<Utc>>,
    pub result: Option<Value>,
    pub exc_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub date_started: Option<DateTime<Utc>>,
    pub date_done: Option<DateTime<Utc>>,
}

impl Job {
    /// Creates a pending job
    pub fn new(name: impl Into<String>, channel: impl Into<String>, payload: Value) -> Self {
        Self {
            id: JobId::new_v7(),
            name: name.into(),
            channel: channel.into(),
            payload,
            related_action: None,
            state: JobState::Pending,
            attempts: 0,
            max_retries: None,
            eta: None,
            result: None,
            exc_info: None,
            created_at: Utc::now(),
            date_started: None,
            date_done: None,
        }
    }

    /// Attaches a related action by name
    pub fn with_related_action(mut self, action: impl Into<String>) -> Self {
        self.related_action = Some(action.into());
        self
    }

    /// Overrides the retry limit for this job
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Whether the job may run at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.eta.map_or(true, |eta| eta <= now)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, JobState::Done | JobState::Failed)
    }
}

/// Failure reported by a job handler
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct JobError {
    pub message: String,
    /// Whether the runner may try the job again
    pub retryable: bool,
}

impl JobError {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

impl From<CoreError> for JobError {
    fn from(error: CoreError) -> Self {
        JobError::permanent(error.to_string())
    }
}

impl From<PortError> for JobError {
    fn from(error: PortError) -> Self {
        if error.is_transient() {
            JobError::retryable(error.to_string())
        } else {
            JobError::permanent(error.to_string())
        }
    }
}

/// Executes the payload of a job
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn perform(&self, payload: &Value) -> Result<Value, JobError>;
}

/// Storage for queued jobs
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Adds a job to the tail of its channel
    async fn enqueue(&self, job: Job) -> Result<JobId, PortError>;

    /// Takes the oldest due job of `channel`, marking it started
    ///
    /// Jobs whose `eta` lies in the future are left in place.
    async fn dequeue(&self, channel: &str) -> Result<Option<Job>, PortError>;

    /// Stores the new state of a job taken with `dequeue`
    async fn update(&self, job: &Job) -> Result<(), PortError>;

    async fn get(&self, id: JobId) -> Result<Job, PortError>;

    /// Number of pending jobs on `channel`
    async fn pending_count(&self, channel: &str) -> Result<usize, PortError>;
}

#[derive(Clone)]
struct RegisteredJob {
    channel: String,
    handler: Arc<dyn JobHandler>,
}

/// Handlers by job name, each bound to a default channel
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: HashMap<String, RegisteredJob>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name` on `channel`
    pub fn register(
        &mut self,
        name: impl Into<String>,
        channel: impl Into<String>,
        handler: Arc<dyn JobHandler>,
    ) -> &mut Self {
        self.jobs.insert(
            name.into(),
            RegisteredJob {
                channel: channel.into(),
                handler,
            },
        );
        self
    }

    pub fn handler(&self, name: &str) -> Option<Arc<dyn JobHandler>> {
        self.jobs.get(name).map(|job| job.handler.clone())
    }

    pub fn channel_for(&self, name: &str) -> Option<&str> {
        self.jobs.get(name).map(|job| job.channel.as_str())
    }

    /// Builds a pending job for a registered handler on its default channel
    pub fn delay(&self, name: &str, payload: Value) -> Result<Job, CoreError> {
        let channel = self
            .channel_for(name)
            .ok_or_else(|| CoreError::not_found(format!("job function {name}")))?;
        Ok(Job::new(name, channel, payload))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.jobs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRegistry")
            .field("jobs", &self.names())
            .finish()
    }
}

/// What an operator should look at for a given job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelatedAction {
    /// Open the form of a single record
    OpenRecord { model: String, record_id: String },
}

/// Callback that resolves the related action of a job
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn call(&self, job: &Job) -> Result<Option<RelatedAction>, PortError>;
}

/// Related-action callbacks by name
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, action: Arc<dyn ActionHandler>) -> &mut Self {
        self.actions.insert(name.into(), action);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Runs the related action named by `job`
    ///
    /// Jobs without a related action resolve to `None`; an unknown action
    /// name is a `NotFound` error.
    pub async fn resolve(&self, job: &Job) -> Result<Option<RelatedAction>, PortError> {
        let Some(name) = job.related_action.as_deref() else {
            return Ok(None);
        };
        let action = self
            .actions
            .get(name)
            .ok_or_else(|| PortError::not_found("related action", name))?;
        action.call(job).await
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.actions.keys().collect();
        names.sort();
        f.debug_struct("ActionRegistry").field("actions", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl JobHandler for Echo {
        async fn perform(&self, payload: &Value) -> Result<Value, JobError> {
            Ok(payload.clone())
        }
    }

    struct OpenPayloadRecord;

    #[async_trait]
    impl ActionHandler for OpenPayloadRecord {
        async fn call(&self, job: &Job) -> Result<Option<RelatedAction>, PortError> {
            Ok(Some(RelatedAction::OpenRecord {
                model: "res.country".to_string(),
                record_id: job.payload["id"].to_string(),
            }))
        }
    }

    #[test]
    fn test_delay_uses_registered_channel() {
        let mut registry = JobRegistry::new();
        registry.register("export", "root.woo", Arc::new(Echo));

        let job = registry.delay("export", json!({"id": 1})).unwrap();
        assert_eq!(job.channel, "root.woo");
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.attempts, 0);
    }

    #[test]
    fn test_job_with_future_eta_is_not_due() {
        let now = Utc::now();
        let mut job = Job::new("export", "root.woo", json!({}));
        assert!(job.is_due(now));

        job.eta = Some(now + chrono::Duration::seconds(30));
        assert!(!job.is_due(now));
        assert!(job.is_due(now + chrono::Duration::seconds(30)));
    }

    #[test]
    fn test_delay_unknown_job_fails() {
        let registry = JobRegistry::new();
        assert!(matches!(
            registry.delay("missing", Value::Null),
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_registered_handler_runs() {
        let mut registry = JobRegistry::new();
        registry.register("export", "root.woo", Arc::new(Echo));

        let handler = registry.handler("export").unwrap();
        let result = handler.perform(&json!({"id": 3})).await.unwrap();
        assert_eq!(result, json!({"id": 3}));
    }

    #[tokio::test]
    async fn test_action_registry_resolves_named_action() {
        let mut actions = ActionRegistry::new();
        actions.register("open", Arc::new(OpenPayloadRecord));

        let job = Job::new("export", "root.woo", json!({"id": 9})).with_related_action("open");
        let action = actions.resolve(&job).await.unwrap();
        assert_eq!(
            action,
            Some(RelatedAction::OpenRecord {
                model: "res.country".to_string(),
                record_id: "9".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_action_registry_without_action() {
        let actions = ActionRegistry::new();
        let job = Job::new("export", "root.woo", Value::Null);
        assert_eq!(actions.resolve(&job).await.unwrap(), None);

        let job = job.with_related_action("unknown");
        assert!(actions.resolve(&job).await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_port_error_retry_classification() {
        assert!(JobError::from(PortError::connection("reset")).retryable);
        assert!(!JobError::from(PortError::not_found("Binding", "x")).retryable);
    }
}
