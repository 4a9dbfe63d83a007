//! Job wiring for the shipping zone export
//!
//! `export_record` is queued on the `root.woo` channel. When the runner
//! picks it up, the handler opens a work context on the binding's backend
//! and delegates to the component registered for `shipping.zone.exporter`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use core_kernel::{
    ActionHandler, ActionRegistry, BindingId, Job, JobError, JobHandler, JobRegistry, PortError,
    RelatedAction,
};

use crate::binding::SHIPPING_ZONE_MODEL;
use crate::country::COUNTRY_MODEL;
use crate::environment::ConnectorEnvironment;
use crate::error::ConnectorError;
use crate::exporter::ExportOutcome;

/// Name of the export job
pub const EXPORT_RECORD_JOB: &str = "woo.shipping.zone.export_record";

/// Channel the connector jobs run on
pub const WOO_CHANNEL: &str = "root.woo";

/// Related action opening the country behind a binding
pub const RELATED_ACTION_UNWRAP_BINDING: &str = "related_action_unwrap_binding";

/// Usage of the shipping zone exporter component
pub const SHIPPING_ZONE_EXPORTER: &str = "shipping.zone.exporter";

/// Payload of `EXPORT_RECORD_JOB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecordPayload {
    pub binding_id: BindingId,
}

impl ExportRecordPayload {
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "binding_id": self.binding_id })
    }

    pub fn from_value(payload: &Value) -> Result<Self, JobError> {
        serde_json::from_value(payload.clone())
            .map_err(|e| JobError::permanent(format!("invalid export payload: {e}")))
    }
}

/// Exports one binding through the component registered for its model
#[instrument(skip(env))]
pub async fn export_shipping_zone(
    env: &ConnectorEnvironment,
    binding_id: BindingId,
) -> Result<ExportOutcome, ConnectorError> {
    let binding = env.ports().bindings.get_binding(binding_id).await?;
    let backend_id = binding.backend_id.ok_or_else(|| {
        ConnectorError::validation(format!("binding {binding_id} has no backend"))
    })?;

    let work = env.work_on(backend_id, SHIPPING_ZONE_MODEL).await?;
    let exporter = work.component(SHIPPING_ZONE_EXPORTER)?;
    exporter.run(binding_id).await
}

/// Job handler for `EXPORT_RECORD_JOB`
#[derive(Debug, Clone)]
pub struct ExportShippingZoneJob {
    env: Arc<ConnectorEnvironment>,
}

impl ExportShippingZoneJob {
    pub fn new(env: Arc<ConnectorEnvironment>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl JobHandler for ExportShippingZoneJob {
    async fn perform(&self, payload: &Value) -> Result<Value, JobError> {
        let payload = ExportRecordPayload::from_value(payload)?;
        let outcome = export_shipping_zone(&self.env, payload.binding_id).await?;
        serde_json::to_value(outcome).map_err(|e| JobError::permanent(e.to_string()))
    }
}

/// Opens the country a binding extends
#[derive(Debug, Clone)]
pub struct UnwrapBindingAction {
    env: Arc<ConnectorEnvironment>,
}

impl UnwrapBindingAction {
    pub fn new(env: Arc<ConnectorEnvironment>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl ActionHandler for UnwrapBindingAction {
    async fn call(&self, job: &Job) -> Result<Option<RelatedAction>, PortError> {
        let payload = ExportRecordPayload::from_value(&job.payload)
            .map_err(|e| PortError::validation(e.message))?;
        let binding = self.env.ports().bindings.get_binding(payload.binding_id).await?;

        Ok(Some(RelatedAction::OpenRecord {
            model: COUNTRY_MODEL.to_string(),
            record_id: binding.odoo_id.to_string(),
        }))
    }
}

/// Registers the connector jobs on `root.woo`
pub fn register_jobs(registry: &mut JobRegistry, env: Arc<ConnectorEnvironment>) {
    registry.register(
        EXPORT_RECORD_JOB,
        WOO_CHANNEL,
        Arc::new(ExportShippingZoneJob::new(env)),
    );
}

pub fn register_actions(registry: &mut ActionRegistry, env: Arc<ConnectorEnvironment>) {
    registry.register(
        RELATED_ACTION_UNWRAP_BINDING,
        Arc::new(UnwrapBindingAction::new(env)),
    );
}
