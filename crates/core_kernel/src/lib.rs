//! Core Kernel - Foundational types for the WooCommerce connector
//!
//! This crate provides the building blocks shared by the connector crates:
//! - Strongly-typed identifiers for countries, backends, bindings and jobs
//! - Port contracts and the unified `PortError`
//! - The component registry used to resolve connector components by usage
//! - Job and related-action registries consumed by the queue runtime

pub mod identifiers;
pub mod error;
pub mod ports;
pub mod registry;
pub mod jobs;
pub mod selection;

pub use identifiers::{CountryId, BackendId, BindingId, JobId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
};
pub use registry::{ComponentKey, ComponentRegistry};
pub use jobs::{
    Job, JobState, JobError, JobHandler, JobQueue, JobRegistry,
    ActionHandler, ActionRegistry, RelatedAction, DEFAULT_CHANNEL,
};
pub use selection::ensure_one;
