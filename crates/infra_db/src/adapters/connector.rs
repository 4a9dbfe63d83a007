//! PostgreSQL Connector Adapter
//!
//! Implements `BackendPort`, `CountryPort` and `ShippingZoneBindingPort`
//! on top of the `ConnectorRepository`.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresConnectorAdapter;
//! use domain_woo::ConnectorPorts;
//!
//! let adapter = Arc::new(PostgresConnectorAdapter::new(pool));
//! let ports = ConnectorPorts::from_store(adapter);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, BackendId, BindingId, CountryId, DomainPort, HealthCheckResult,
    HealthCheckable, PortError,
};
use domain_woo::{
    BackendPort, Country, CountryPort, ShippingZoneBinding, ShippingZoneBindingPort, WooBackend,
};

use crate::error::DatabaseError;
use crate::repositories::shipping_zone::{BackendRow, BindingRow, ConnectorRepository, CountryRow};

const ADAPTER_ID: &str = "postgres-connector-adapter";

/// PostgreSQL-backed implementation of the connector ports
///
/// Database errors are translated to `PortError`:
/// - `DatabaseError::NotFound` -> `PortError::NotFound`
/// - `DatabaseError::DuplicateEntry` -> `PortError::Conflict`
/// - connection failures -> `PortError::Connection`
/// - anything else -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresConnectorAdapter {
    repository: ConnectorRepository,
}

impl PostgresConnectorAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ConnectorRepository::new(pool),
        }
    }

    pub fn repository(&self) -> &ConnectorRepository {
        &self.repository
    }
}

impl DomainPort for PostgresConnectorAdapter {}

#[async_trait]
impl HealthCheckable for PostgresConnectorAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = self.repository.ping().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(()) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {e}"))),
        };
        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl BackendPort for PostgresConnectorAdapter {
    #[instrument(skip(self), fields(backend_id = %id))]
    async fn get_backend(&self, id: BackendId) -> Result<WooBackend, PortError> {
        let row = self.repository.get_backend(*id.as_uuid()).await?;
        Ok(row_to_backend(row))
    }

    async fn list_backends(&self) -> Result<Vec<WooBackend>, PortError> {
        let rows = self.repository.list_backends().await?;
        Ok(rows.into_iter().map(row_to_backend).collect())
    }

    #[instrument(skip(self, backend), fields(backend_id = %backend.id))]
    async fn save_backend(&self, backend: &WooBackend) -> Result<(), PortError> {
        self.repository.upsert_backend(&backend_to_row(backend)).await?;
        Ok(())
    }
}

#[async_trait]
impl CountryPort for PostgresConnectorAdapter {
    async fn get_country(&self, id: CountryId) -> Result<Country, PortError> {
        let row = self.repository.get_country(*id.as_uuid()).await?;
        Ok(row_to_country(row))
    }

    async fn save_country(&self, country: &Country) -> Result<(), PortError> {
        self.repository.upsert_country(&country_to_row(country)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(country_id = %id))]
    async fn set_sync_settings(
        &self,
        id: CountryId,
        sync_data: bool,
        woo_backend_id: Option<BackendId>,
    ) -> Result<Country, PortError> {
        let row = self
            .repository
            .update_sync_settings(*id.as_uuid(), sync_data, woo_backend_id.map(|b| *b.as_uuid()))
            .await?;
        Ok(row_to_country(row))
    }

    async fn find_marked_for_sync(&self, backend_id: BackendId) -> Result<Vec<Country>, PortError> {
        let rows = self.repository.find_marked_for_sync(*backend_id.as_uuid()).await?;
        debug!(count = rows.len(), "Countries marked for synchronization");
        Ok(rows.into_iter().map(row_to_country).collect())
    }

    #[instrument(skip(self), fields(country_id = %id))]
    async fn delete_country(&self, id: CountryId) -> Result<(), PortError> {
        self.repository.delete_country(*id.as_uuid()).await?;
        Ok(())
    }
}

#[async_trait]
impl ShippingZoneBindingPort for PostgresConnectorAdapter {
    async fn get_binding(&self, id: BindingId) -> Result<ShippingZoneBinding, PortError> {
        let row = self.repository.get_binding(*id.as_uuid()).await?;
        Ok(row_to_binding(row))
    }

    async fn bindings_for_country(
        &self,
        country_id: CountryId,
    ) -> Result<Vec<ShippingZoneBinding>, PortError> {
        let rows = self.repository.bindings_for_country(*country_id.as_uuid()).await?;
        Ok(rows.into_iter().map(row_to_binding).collect())
    }

    async fn find_binding(
        &self,
        country_id: CountryId,
        backend_id: BackendId,
    ) -> Result<Option<ShippingZoneBinding>, PortError> {
        let row = self
            .repository
            .find_binding(*country_id.as_uuid(), *backend_id.as_uuid())
            .await?;
        Ok(row.map(row_to_binding))
    }

    #[instrument(skip(self), fields(country_id = %country_id, backend_id = %backend_id))]
    async fn create_binding(
        &self,
        country_id: CountryId,
        backend_id: BackendId,
    ) -> Result<ShippingZoneBinding, PortError> {
        let binding = ShippingZoneBinding::new(country_id, backend_id);
        match self.repository.insert_binding(&binding_to_row(&binding)).await {
            Ok(()) => Ok(binding),
            Err(DatabaseError::DuplicateEntry(_)) => Err(PortError::conflict(format!(
                "{country_id} is already bound to {backend_id}"
            ))),
            Err(DatabaseError::ForeignKeyViolation(message)) => {
                debug!(%message, "Binding references a missing record");
                Err(PortError::not_found("Country", country_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn record_export(
        &self,
        id: BindingId,
        external_id: i64,
        sync_date: DateTime<Utc>,
    ) -> Result<ShippingZoneBinding, PortError> {
        let row = self
            .repository
            .record_export(*id.as_uuid(), external_id, sync_date)
            .await?;
        Ok(row_to_binding(row))
    }
}

// ============================================================================
// Row conversions
// ============================================================================

fn row_to_backend(row: BackendRow) -> WooBackend {
    WooBackend {
        id: BackendId::from_uuid(row.backend_id),
        name: row.name,
        location: row.location,
        consumer_key: row.consumer_key,
        consumer_secret: row.consumer_secret,
        version: row.version,
        verify_ssl: row.verify_ssl,
    }
}

fn backend_to_row(backend: &WooBackend) -> BackendRow {
    BackendRow {
        backend_id: *backend.id.as_uuid(),
        name: backend.name.clone(),
        location: backend.location.clone(),
        consumer_key: backend.consumer_key.clone(),
        consumer_secret: backend.consumer_secret.clone(),
        version: backend.version.clone(),
        verify_ssl: backend.verify_ssl,
    }
}

fn row_to_country(row: CountryRow) -> Country {
    Country {
        id: CountryId::from_uuid(row.country_id),
        name: row.name,
        code: row.code,
        sync_data: row.sync_data,
        woo_backend_id: row.woo_backend_id.map(BackendId::from_uuid),
    }
}

fn country_to_row(country: &Country) -> CountryRow {
    CountryRow {
        country_id: *country.id.as_uuid(),
        name: country.name.clone(),
        code: country.code.clone(),
        sync_data: country.sync_data,
        woo_backend_id: country.woo_backend_id.map(|b| *b.as_uuid()),
    }
}

fn row_to_binding(row: BindingRow) -> ShippingZoneBinding {
    ShippingZoneBinding {
        id: BindingId::from_uuid(row.binding_id),
        odoo_id: CountryId::from_uuid(row.odoo_id),
        backend_id: row.backend_id.map(BackendId::from_uuid),
        external_id: row.external_id,
        sync_date: row.sync_date,
    }
}

fn binding_to_row(binding: &ShippingZoneBinding) -> BindingRow {
    BindingRow {
        binding_id: *binding.id.as_uuid(),
        odoo_id: *binding.odoo_id.as_uuid(),
        backend_id: binding.backend_id.map(|b| *b.as_uuid()),
        external_id: binding.external_id,
        sync_date: binding.sync_date,
    }
}
