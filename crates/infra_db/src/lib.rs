//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the WooCommerce connector using SQLx:
//! backends, countries and their shipping zone bindings.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. `repositories` holds the SQL;
//! `adapters` implements the domain ports on top of it and translates
//! `DatabaseError` into `PortError`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresConnectorAdapter;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/woo_connector")).await?;
//! run_migrations(&pool).await?;
//! let adapter = PostgresConnectorAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::PostgresConnectorAdapter;
