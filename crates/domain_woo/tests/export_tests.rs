//! Export flow: queueing, job execution, exporter and related action

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use core_kernel::{
    ActionRegistry, BackendId, BindingId, CoreError, JobQueue, JobRegistry, JobState, RelatedAction,
};
use domain_woo::adapter::mock::{RecordingTransport, StaticTransportFactory};
use domain_woo::ports::mock::InMemoryStore;
use domain_woo::{
    register_actions, register_jobs, ConnectorEnvironment, ConnectorError, ConnectorPorts, Country,
    CountryPort, HttpMethod, ShippingZoneBindingPort, ShippingZoneService, WooBackend,
    COUNTRY_MODEL, EXPORT_RECORD_JOB, RELATED_ACTION_UNWRAP_BINDING, SHIPPING_ZONE_EXPORTER,
    SHIPPING_ZONE_MODEL, WOO_CHANNEL,
};
use infra_queue::{InMemoryJobQueue, JobRunner, RunnerConfig};

struct Harness {
    backend: WooBackend,
    store: Arc<InMemoryStore>,
    transport: Arc<RecordingTransport>,
    env: Arc<ConnectorEnvironment>,
    queue: Arc<InMemoryJobQueue>,
    jobs: Arc<JobRegistry>,
    actions: ActionRegistry,
    service: ShippingZoneService,
}

impl Harness {
    async fn new(countries: Vec<Country>) -> Self {
        Self::with_backend(
            WooBackend::new("Shop", "https://shop.example.com", "ck_test", "cs_test"),
            countries,
        )
        .await
    }

    async fn with_backend(backend: WooBackend, countries: Vec<Country>) -> Self {
        let store = Arc::new(InMemoryStore::with_records(vec![backend.clone()], countries).await);
        let transport = Arc::new(RecordingTransport::new());
        let env = Arc::new(ConnectorEnvironment::new(
            ConnectorPorts::from_store(store.clone()),
            Arc::new(StaticTransportFactory::new(transport.clone())),
        ));

        let mut jobs = JobRegistry::new();
        register_jobs(&mut jobs, env.clone());
        let jobs = Arc::new(jobs);
        let mut actions = ActionRegistry::new();
        register_actions(&mut actions, env.clone());

        let queue = Arc::new(InMemoryJobQueue::new());
        let service = ShippingZoneService::new(env.clone(), queue.clone(), jobs.clone());

        Self {
            backend,
            store,
            transport,
            env,
            queue,
            jobs,
            actions,
            service,
        }
    }

    fn runner(&self) -> JobRunner {
        JobRunner::new(
            self.queue.clone(),
            self.jobs.clone(),
            RunnerConfig {
                retry_backoff: Duration::ZERO,
                ..RunnerConfig::default()
            },
        )
    }

    async fn bind(&self, country: &Country) -> BindingId {
        self.store
            .create_binding(country.id, self.backend.id)
            .await
            .unwrap()
            .id
    }
}

// ============================================================================
// export_record
// ============================================================================

mod export_record_tests {
    use super::*;

    #[tokio::test]
    async fn test_export_record_queues_one_job() {
        let country = Country::new("Spain", "ES");
        let h = Harness::new(vec![country.clone()]).await;
        let binding_id = h.bind(&country).await;

        let job_id = h.service.export_record(&[binding_id]).await.unwrap();

        let job = h.queue.get(job_id).await.unwrap();
        assert_eq!(job.name, EXPORT_RECORD_JOB);
        assert_eq!(job.channel, WOO_CHANNEL);
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.related_action.as_deref(), Some(RELATED_ACTION_UNWRAP_BINDING));
        assert_eq!(job.payload, json!({"binding_id": binding_id}));
        assert_eq!(h.queue.pending_count(WOO_CHANNEL).await.unwrap(), 1);
        assert_eq!(h.transport.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_export_record_on_empty_selection_fails() {
        let h = Harness::new(vec![]).await;

        let err = h.service.export_record(&[]).await.unwrap_err();

        assert!(matches!(
            err,
            ConnectorError::Core(CoreError::EnsureOne { count: 0, .. })
        ));
        assert!(h.queue.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_export_record_on_two_bindings_fails() {
        let spain = Country::new("Spain", "ES");
        let france = Country::new("France", "FR");
        let h = Harness::new(vec![spain.clone(), france.clone()]).await;
        let first = h.bind(&spain).await;
        let second = h.bind(&france).await;

        let err = h.service.export_record(&[first, second]).await.unwrap_err();

        match err {
            ConnectorError::Core(CoreError::EnsureOne { model, count }) => {
                assert_eq!(model, SHIPPING_ZONE_MODEL);
                assert_eq!(count, 2);
            }
            other => panic!("expected EnsureOne, got {other:?}"),
        }
        assert!(h.queue.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_export_record_on_unknown_binding_fails() {
        let h = Harness::new(vec![]).await;

        let err = h.service.export_record(&[BindingId::new()]).await.unwrap_err();

        assert!(matches!(err, ConnectorError::Port(ref e) if e.is_not_found()));
        assert!(h.queue.jobs().await.is_empty());
    }
}

// ============================================================================
// Job execution and exporter
// ============================================================================

mod exporter_tests {
    use super::*;

    #[tokio::test]
    async fn test_first_export_creates_zone() {
        let country = Country::new("Spain", "ES");
        let h = Harness::new(vec![country.clone()]).await;
        let binding_id = h.bind(&country).await;
        h.transport.push_response(json!({"id": 31, "name": "Spain", "order": 0})).await;

        let job_id = h.service.export_record(&[binding_id]).await.unwrap();
        h.runner().drain(WOO_CHANNEL).await.unwrap();

        let job = h.queue.get(job_id).await.unwrap();
        assert_eq!(job.state, JobState::Done);
        assert_eq!(
            job.result,
            Some(json!({"binding_id": binding_id, "external_id": 31, "created": true}))
        );

        let calls = h.transport.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, HttpMethod::Post);
        assert_eq!(calls[0].resource, "shipping/zones");
        assert_eq!(calls[0].arguments, json!({"shipping_zone": {"name": "Spain", "order": 0}}));

        let binding = h.store.get_binding(binding_id).await.unwrap();
        assert_eq!(binding.external_id, Some(31));
        assert!(binding.sync_date.is_some());
    }

    #[tokio::test]
    async fn test_exported_binding_is_updated() {
        let country = Country::new("Spain", "ES");
        let h = Harness::new(vec![country.clone()]).await;
        let binding_id = h.bind(&country).await;
        h.store
            .record_export(binding_id, 31, chrono::Utc::now())
            .await
            .unwrap();
        h.transport.push_response(json!({"id": 31})).await;

        let outcome = domain_woo::export_shipping_zone(&h.env, binding_id).await.unwrap();

        assert_eq!(outcome.external_id, 31);
        assert!(!outcome.created);
        let calls = h.transport.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, HttpMethod::Put);
        assert_eq!(calls[0].resource, "shipping/zones/31");
    }

    #[tokio::test]
    async fn test_zone_deleted_remotely_is_recreated() {
        let country = Country::new("Spain", "ES");
        let h = Harness::new(vec![country.clone()]).await;
        let binding_id = h.bind(&country).await;
        h.store
            .record_export(binding_id, 31, chrono::Utc::now())
            .await
            .unwrap();
        h.transport.push_fault(102, "Invalid ID.").await;
        h.transport.push_response(json!({"id": 58})).await;

        let outcome = domain_woo::export_shipping_zone(&h.env, binding_id).await.unwrap();

        assert_eq!(outcome.external_id, 58);
        assert!(outcome.created);
        let methods: Vec<_> = h.transport.calls().await.into_iter().map(|c| c.method).collect();
        assert_eq!(methods, vec![HttpMethod::Put, HttpMethod::Post]);
        assert_eq!(
            h.store.get_binding(binding_id).await.unwrap().external_id,
            Some(58)
        );
    }

    #[tokio::test]
    async fn test_create_without_id_is_invalid_response() {
        let country = Country::new("Spain", "ES");
        let h = Harness::new(vec![country.clone()]).await;
        let binding_id = h.bind(&country).await;
        h.transport.push_response(json!({"name": "Spain"})).await;

        let err = domain_woo::export_shipping_zone(&h.env, binding_id).await.unwrap_err();

        assert!(matches!(err, ConnectorError::InvalidResponse(_)));
        assert_eq!(h.store.get_binding(binding_id).await.unwrap().external_id, None);
    }

    #[tokio::test]
    async fn test_server_fault_is_retried_by_runner() {
        let country = Country::new("Spain", "ES");
        let h = Harness::new(vec![country.clone()]).await;
        let binding_id = h.bind(&country).await;
        h.transport.push_fault(503, "Service Unavailable").await;
        h.transport.push_response(json!({"id": 12})).await;

        let job_id = h.service.export_record(&[binding_id]).await.unwrap();
        h.runner().drain(WOO_CHANNEL).await.unwrap();

        let job = h.queue.get(job_id).await.unwrap();
        assert_eq!(job.state, JobState::Done);
        assert_eq!(job.attempts, 2);
    }

    #[tokio::test]
    async fn test_client_fault_fails_job_at_once() {
        let country = Country::new("Spain", "ES");
        let h = Harness::new(vec![country.clone()]).await;
        let binding_id = h.bind(&country).await;
        h.transport.push_fault(401, "Unauthorized").await;

        let job_id = h.service.export_record(&[binding_id]).await.unwrap();
        h.runner().drain(WOO_CHANNEL).await.unwrap();

        let job = h.queue.get(job_id).await.unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.attempts, 1);
        assert!(job.exc_info.unwrap().contains("Unauthorized"));
    }

    #[tokio::test]
    async fn test_exporter_is_resolved_by_usage() {
        let h = Harness::new(vec![]).await;
        assert!(h
            .env
            .components()
            .contains(SHIPPING_ZONE_MODEL, SHIPPING_ZONE_EXPORTER));

        let work = h.env.work_on(h.backend.id, SHIPPING_ZONE_MODEL).await.unwrap();
        assert!(work.component(SHIPPING_ZONE_EXPORTER).is_ok());
    }
}

// ============================================================================
// Related action
// ============================================================================

mod related_action_tests {
    use super::*;

    #[tokio::test]
    async fn test_unwrap_binding_opens_country() {
        let country = Country::new("Spain", "ES");
        let h = Harness::new(vec![country.clone()]).await;
        let binding_id = h.bind(&country).await;

        let job_id = h.service.export_record(&[binding_id]).await.unwrap();
        let job = h.queue.get(job_id).await.unwrap();
        let action = h.actions.resolve(&job).await.unwrap();

        assert_eq!(
            action,
            Some(RelatedAction::OpenRecord {
                model: COUNTRY_MODEL.to_string(),
                record_id: country.id.to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_unwrap_binding_after_cascade_delete() {
        let country = Country::new("Spain", "ES");
        let h = Harness::new(vec![country.clone()]).await;
        let binding_id = h.bind(&country).await;
        let job_id = h.service.export_record(&[binding_id]).await.unwrap();

        h.store.delete_country(country.id).await.unwrap();

        let job = h.queue.get(job_id).await.unwrap();
        assert!(h.actions.resolve(&job).await.unwrap_err().is_not_found());
    }
}

// ============================================================================
// Country synchronization
// ============================================================================

mod sync_tests {
    use super::*;

    #[tokio::test]
    async fn test_sync_marked_countries_binds_and_queues() {
        let backend = WooBackend::new("Shop", "https://shop.example.com", "ck", "cs");
        let marked = Country::new("Portugal", "PT").mark_for_sync(backend.id);
        let other_backend = Country::new("Greece", "GR").mark_for_sync(BackendId::new());
        let unmarked = Country::new("Italy", "IT");
        let h = Harness::with_backend(
            backend,
            vec![marked.clone(), other_backend.clone(), unmarked.clone()],
        )
        .await;

        let queued = h.service.sync_marked_countries(h.backend.id).await.unwrap();

        assert_eq!(queued.len(), 1);
        let bindings = h.service.country_bindings(marked.id).await.unwrap();
        assert_eq!(bindings.len(), 1);
        assert!(h.service.country_bindings(other_backend.id).await.unwrap().is_empty());
        assert!(h.service.country_bindings(unmarked.id).await.unwrap().is_empty());

        // A second pass reuses the binding
        h.service.sync_marked_countries(h.backend.id).await.unwrap();
        assert_eq!(h.service.country_bindings(marked.id).await.unwrap().len(), 1);
        assert_eq!(h.queue.pending_count(WOO_CHANNEL).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_shipping_zone_record_reads_country() {
        let country = Country::new("Spain", "ES");
        let h = Harness::new(vec![country.clone()]).await;
        let binding_id = h.bind(&country).await;

        let record = h.service.shipping_zone_record(binding_id).await.unwrap();
        assert_eq!(record.name(), "Spain");
        assert_eq!(record.code(), "ES");
    }

    #[tokio::test]
    async fn test_list_remote_zone_ids_drops_missing_ids() {
        let h = Harness::new(vec![]).await;
        h.transport
            .push_response(json!([{"id": 1}, {"name": "Rest of the world"}, {"id": 3}]))
            .await;

        let ids = h
            .service
            .list_remote_zone_ids(h.backend.id, None, None)
            .await
            .unwrap();

        assert_eq!(ids, vec![1, 3]);
        assert_eq!(h.transport.calls().await[0].method, HttpMethod::Get);
    }

    #[tokio::test]
    async fn test_set_sync_settings_enables_export() {
        let country = Country::new("Spain", "ES");
        let h = Harness::new(vec![country.clone()]).await;

        h.store
            .set_sync_settings(country.id, true, Some(h.backend.id))
            .await
            .unwrap();

        let queued = h.service.sync_marked_countries(h.backend.id).await.unwrap();
        assert_eq!(queued.len(), 1);
    }
}
