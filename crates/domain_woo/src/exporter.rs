//! Exporters
//!
//! An exporter pushes one binding to the store of its work context and
//! records the resulting external id on the binding.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use core_kernel::BindingId;

use crate::binding::ShippingZoneRecord;
use crate::environment::WorkContext;
use crate::error::ConnectorError;

/// Result of one export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOutcome {
    pub binding_id: BindingId,
    pub external_id: i64,
    /// True when the record was created on the store
    pub created: bool,
}

/// Component that exports a binding
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn run(&self, binding_id: BindingId) -> Result<ExportOutcome, ConnectorError>;
}

/// Exports countries as WooCommerce shipping zones
#[derive(Debug, Clone)]
pub struct ShippingZoneExporter {
    work: WorkContext,
}

impl ShippingZoneExporter {
    pub fn new(work: WorkContext) -> Self {
        Self { work }
    }

    async fn load_record(&self, binding_id: BindingId) -> Result<ShippingZoneRecord, ConnectorError> {
        let ports = &self.work.ports;
        let binding = ports.bindings.get_binding(binding_id).await?;
        if binding.backend_id != Some(self.work.backend.id) {
            return Err(ConnectorError::validation(format!(
                "binding {} does not belong to backend {}",
                binding.id, self.work.backend.id
            )));
        }
        let country = ports.countries.get_country(binding.odoo_id).await?;
        ShippingZoneRecord::join(binding, country)
    }
}

#[async_trait]
impl Exporter for ShippingZoneExporter {
    #[instrument(skip(self), fields(backend = %self.work.backend.name))]
    async fn run(&self, binding_id: BindingId) -> Result<ExportOutcome, ConnectorError> {
        let record = self.load_record(binding_id).await?;
        let adapter = self.work.shipping_zone_adapter();
        let payload = record.to_payload();

        let (external_id, created) = match record.binding.external_id {
            Some(external_id) => match adapter.write(external_id, payload.clone()).await {
                Ok(_) => (external_id, false),
                Err(error) if error.is_missing_on_backend() => {
                    warn!(external_id, "Shipping zone vanished from the store, creating it again");
                    let response = adapter.create(payload).await?;
                    (external_id_from(&response)?, true)
                }
                Err(error) => return Err(error),
            },
            None => {
                let response = adapter.create(payload).await?;
                (external_id_from(&response)?, true)
            }
        };

        self.work
            .ports
            .bindings
            .record_export(binding_id, external_id, Utc::now())
            .await?;

        info!(
            binding_id = %binding_id,
            country = %record.code(),
            external_id,
            created,
            "Exported shipping zone"
        );
        Ok(ExportOutcome {
            binding_id,
            external_id,
            created,
        })
    }
}

/// Reads the new zone id from a create response
///
/// Accepts the zone itself or the zone wrapped in `shipping_zone`.
fn external_id_from(response: &Value) -> Result<i64, ConnectorError> {
    response
        .get("id")
        .or_else(|| response.get("shipping_zone").and_then(|zone| zone.get("id")))
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            ConnectorError::invalid_response(format!("created shipping zone has no id: {response}"))
        })
}
