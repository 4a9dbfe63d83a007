//! Repository implementations
//!
//! Repositories encapsulate SQL queries and map rows with `sqlx::FromRow`.
//! Queries are checked at runtime so the crate builds without a live
//! database.

pub mod shipping_zone;

pub use shipping_zone::{BackendRow, BindingRow, ConnectorRepository, CountryRow};
