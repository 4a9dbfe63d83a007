//! Test Utilities Crate
//!
//! Shared test infrastructure for the WooCommerce connector test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built backends, countries and WooCommerce responses
//! - `builders`: Builder patterns for test data construction
//! - `assertions`: Assertions over calls seen by the recording transport
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
