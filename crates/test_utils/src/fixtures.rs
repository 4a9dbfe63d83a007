//! Pre-built Test Fixtures
//!
//! Consistent, predictable data for unit and integration tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use domain_woo::adapter::mock::{RecordingTransport, StaticTransportFactory};
use domain_woo::ports::mock::InMemoryStore;
use domain_woo::{ConnectorEnvironment, ConnectorPorts, Country, WooBackend};

/// Fixture for WooCommerce backends
pub struct BackendFixtures;

impl BackendFixtures {
    /// A valid store on the default API version
    pub fn shop() -> WooBackend {
        WooBackend::new("Test shop", "https://shop.example.com", "ck_test", "cs_test")
    }

    /// A store served by `base_url`, e.g. a `wiremock` server
    pub fn at(base_url: impl Into<String>) -> WooBackend {
        WooBackend::new("Mock shop", base_url, "ck_test", "cs_test")
    }
}

/// Fixture for countries
pub struct CountryFixtures;

impl CountryFixtures {
    pub fn spain() -> Country {
        Country::new("Spain", "ES")
    }

    pub fn germany() -> Country {
        Country::new("Germany", "DE")
    }

    /// A country flagged for export to `backend`
    pub fn marked(backend: &WooBackend) -> Country {
        Country::new("Netherlands", "NL").mark_for_sync(backend.id)
    }
}

/// Fixture for `shipping/zones` responses
pub struct ZoneResponseFixtures;

impl ZoneResponseFixtures {
    /// A zone as WooCommerce returns it
    pub fn zone(id: i64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "order": 0,
            "_links": {"self": [{"href": format!("https://shop.example.com/wp-json/wc/v3/shipping/zones/{id}")}]}
        })
    }

    /// A search response holding the given ids in order
    pub fn search(ids: &[i64]) -> Value {
        Value::Array(ids.iter().map(|id| Self::zone(*id, &format!("Zone {id}"))).collect())
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Start of a search window (Jan 1, 2024)
    pub fn window_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    /// End of a search window (Jan 31, 2024 23:59:59)
    pub fn window_end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()
    }
}

/// In-memory store, recording transport and the environment built on them
pub struct TestConnector {
    pub backend: WooBackend,
    pub store: Arc<InMemoryStore>,
    pub transport: Arc<RecordingTransport>,
    pub env: Arc<ConnectorEnvironment>,
}

impl TestConnector {
    /// Sets up the shop backend with `countries`
    pub async fn new(countries: Vec<Country>) -> Self {
        Self::with_backend(BackendFixtures::shop(), countries).await
    }

    pub async fn with_backend(backend: WooBackend, countries: Vec<Country>) -> Self {
        let store = Arc::new(InMemoryStore::with_records(vec![backend.clone()], countries).await);
        let transport = Arc::new(RecordingTransport::new());
        let env = Arc::new(ConnectorEnvironment::new(
            ConnectorPorts::from_store(store.clone()),
            Arc::new(StaticTransportFactory::new(transport.clone())),
        ));
        Self {
            backend,
            store,
            transport,
            env,
        }
    }
}
