//! Domain Adapters
//!
//! Port implementations backed by PostgreSQL.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresConnectorAdapter;
//! use domain_woo::ShippingZoneBindingPort;
//!
//! let adapter = PostgresConnectorAdapter::new(pool);
//! let binding = adapter.get_binding(binding_id).await?;
//! ```

pub mod connector;

pub use connector::PostgresConnectorAdapter;
