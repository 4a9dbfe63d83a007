//! Job queue runtime
//!
//! - `memory`: `InMemoryJobQueue`, per-channel FIFOs behind a mutex, with a
//!   bounded window of finished jobs
//! - `runner`: `JobRunner`, which pops jobs, dispatches them through the
//!   `JobRegistry` and applies the retry policy

pub mod memory;
pub mod runner;

pub use memory::{InMemoryJobQueue, DEFAULT_FINISHED_CAPACITY};
pub use runner::{
    JobRunner, RunnerConfig, DEFAULT_MAX_RETRIES, DEFAULT_MAX_RETRY_BACKOFF, DEFAULT_RETRY_BACKOFF,
};
