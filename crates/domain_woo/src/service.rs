//! Shipping zone service
//!
//! Entry points used by the worker and by callers acting on records:
//! queueing exports, synchronizing flagged countries and listing remote
//! zones.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use core_kernel::{ensure_one, BackendId, BindingId, CountryId, JobId, JobQueue, JobRegistry};

use crate::adapter::HttpMethod;
use crate::binding::{ShippingZoneBinding, ShippingZoneRecord, SHIPPING_ZONE_MODEL};
use crate::environment::ConnectorEnvironment;
use crate::error::ConnectorError;
use crate::jobs::{ExportRecordPayload, EXPORT_RECORD_JOB, RELATED_ACTION_UNWRAP_BINDING};
use crate::ports::ShippingZoneBindingPortExt;

/// Operations on shipping zone bindings
#[derive(Clone)]
pub struct ShippingZoneService {
    env: Arc<ConnectorEnvironment>,
    queue: Arc<dyn JobQueue>,
    jobs: Arc<JobRegistry>,
}

impl ShippingZoneService {
    pub fn new(
        env: Arc<ConnectorEnvironment>,
        queue: Arc<dyn JobQueue>,
        jobs: Arc<JobRegistry>,
    ) -> Self {
        Self { env, queue, jobs }
    }

    /// Queues the export of a single binding
    ///
    /// The selection must hold exactly one binding; otherwise nothing is
    /// queued.
    #[instrument(skip(self))]
    pub async fn export_record(&self, bindings: &[BindingId]) -> Result<JobId, ConnectorError> {
        let binding_id = *ensure_one(SHIPPING_ZONE_MODEL, bindings)?;
        self.env.ports().bindings.get_binding(binding_id).await?;

        let job = self
            .jobs
            .delay(EXPORT_RECORD_JOB, ExportRecordPayload { binding_id }.to_value())?
            .with_related_action(RELATED_ACTION_UNWRAP_BINDING);
        let job_id = self.queue.enqueue(job).await?;

        debug!(binding_id = %binding_id, job_id = %job_id, "Queued shipping zone export");
        Ok(job_id)
    }

    /// Queues an export for every country flagged for `backend_id`
    ///
    /// Bindings are created on the fly for countries that have none yet.
    #[instrument(skip(self))]
    pub async fn sync_marked_countries(
        &self,
        backend_id: BackendId,
    ) -> Result<Vec<JobId>, ConnectorError> {
        let ports = self.env.ports();
        let countries = ports.countries.find_marked_for_sync(backend_id).await?;

        let mut queued = Vec::with_capacity(countries.len());
        for country in countries {
            let binding = ports
                .bindings
                .get_or_create_binding(country.id, backend_id)
                .await?;
            queued.push(self.export_record(&[binding.id]).await?);
        }

        if !queued.is_empty() {
            info!(backend_id = %backend_id, count = queued.len(), "Queued shipping zone synchronization");
        }
        Ok(queued)
    }

    /// Bindings of a country across backends
    pub async fn country_bindings(
        &self,
        country_id: CountryId,
    ) -> Result<Vec<ShippingZoneBinding>, ConnectorError> {
        Ok(self.env.ports().bindings.bindings_for_country(country_id).await?)
    }

    /// A binding joined with its country
    pub async fn shipping_zone_record(
        &self,
        binding_id: BindingId,
    ) -> Result<ShippingZoneRecord, ConnectorError> {
        let ports = self.env.ports();
        let binding = ports.bindings.get_binding(binding_id).await?;
        let country = ports.countries.get_country(binding.odoo_id).await?;
        ShippingZoneRecord::join(binding, country)
    }

    /// Ids of the zones of `backend_id` updated within the given window
    ///
    /// Zones returned without an id are dropped here.
    pub async fn list_remote_zone_ids(
        &self,
        backend_id: BackendId,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> Result<Vec<i64>, ConnectorError> {
        let work = self.env.work_on(backend_id, SHIPPING_ZONE_MODEL).await?;
        let ids = work
            .shipping_zone_adapter()
            .search(HttpMethod::Get, None, from_date, to_date)
            .await?;

        let total = ids.len();
        let ids: Vec<i64> = ids.into_iter().flatten().collect();
        if ids.len() < total {
            warn!(backend_id = %backend_id, skipped = total - ids.len(), "Ignoring zones without id");
        }
        Ok(ids)
    }
}
