//! Connector Ports
//!
//! Storage interfaces for backends, countries and shipping zone bindings.
//!
//! - **Internal Adapter**: PostgreSQL (`infra_db::adapters::PostgresConnectorAdapter`)
//! - **Mock Adapter**: in-memory store for tests (`mock::InMemoryStore`)
//!
//! Deleting a country deletes its bindings in every adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{BackendId, BindingId, CountryId, DomainPort, PortError};

use crate::backend::WooBackend;
use crate::binding::ShippingZoneBinding;
use crate::country::Country;

/// Port for WooCommerce backends
#[async_trait]
pub trait BackendPort: DomainPort {
    async fn get_backend(&self, id: BackendId) -> Result<WooBackend, PortError>;

    async fn list_backends(&self) -> Result<Vec<WooBackend>, PortError>;

    /// Inserts or replaces a backend
    async fn save_backend(&self, backend: &WooBackend) -> Result<(), PortError>;
}

/// Port for the country records and their synchronization fields
#[async_trait]
pub trait CountryPort: DomainPort {
    async fn get_country(&self, id: CountryId) -> Result<Country, PortError>;

    /// Inserts or replaces a country
    async fn save_country(&self, country: &Country) -> Result<(), PortError>;

    /// Sets `sync_data` and `woo_backend_id`
    async fn set_sync_settings(
        &self,
        id: CountryId,
        sync_data: bool,
        woo_backend_id: Option<BackendId>,
    ) -> Result<Country, PortError>;

    /// Countries flagged for synchronization with `backend_id`
    async fn find_marked_for_sync(&self, backend_id: BackendId) -> Result<Vec<Country>, PortError>;

    /// Deletes a country together with its bindings
    async fn delete_country(&self, id: CountryId) -> Result<(), PortError>;
}

/// Port for shipping zone bindings
#[async_trait]
pub trait ShippingZoneBindingPort: DomainPort {
    async fn get_binding(&self, id: BindingId) -> Result<ShippingZoneBinding, PortError>;

    /// Bindings of a country, one per backend
    async fn bindings_for_country(
        &self,
        country_id: CountryId,
    ) -> Result<Vec<ShippingZoneBinding>, PortError>;

    async fn find_binding(
        &self,
        country_id: CountryId,
        backend_id: BackendId,
    ) -> Result<Option<ShippingZoneBinding>, PortError>;

    /// Creates the binding of `country_id` on `backend_id`
    ///
    /// Fails with `Conflict` if the pair is already bound and with
    /// `NotFound` if the country does not exist.
    async fn create_binding(
        &self,
        country_id: CountryId,
        backend_id: BackendId,
    ) -> Result<ShippingZoneBinding, PortError>;

    /// Stores the result of a successful export
    async fn record_export(
        &self,
        id: BindingId,
        external_id: i64,
        sync_date: DateTime<Utc>,
    ) -> Result<ShippingZoneBinding, PortError>;
}

/// Convenience operations built on top of `ShippingZoneBindingPort`
#[async_trait]
pub trait ShippingZoneBindingPortExt: ShippingZoneBindingPort {
    /// Returns the existing binding for the pair or creates it
    async fn get_or_create_binding(
        &self,
        country_id: CountryId,
        backend_id: BackendId,
    ) -> Result<ShippingZoneBinding, PortError> {
        match self.find_binding(country_id, backend_id).await? {
            Some(binding) => Ok(binding),
            None => self.create_binding(country_id, backend_id).await,
        }
    }
}

impl<T: ShippingZoneBindingPort + ?Sized> ShippingZoneBindingPortExt for T {}

/// In-memory implementation of the connector ports
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable};

    /// Backends, countries and bindings held in memory
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryStore {
        backends: Arc<RwLock<HashMap<BackendId, WooBackend>>>,
        countries: Arc<RwLock<HashMap<CountryId, Country>>>,
        bindings: Arc<RwLock<HashMap<BindingId, ShippingZoneBinding>>>,
    }

    impl InMemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store
        pub async fn with_records(backends: Vec<WooBackend>, countries: Vec<Country>) -> Self {
            let store = Self::new();
            for backend in backends {
                store.backends.write().await.insert(backend.id, backend);
            }
            for country in countries {
                store.countries.write().await.insert(country.id, country);
            }
            store
        }

        pub async fn binding_count(&self) -> usize {
            self.bindings.read().await.len()
        }
    }

    impl DomainPort for InMemoryStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "in-memory-connector-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("In-memory store always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl BackendPort for InMemoryStore {
        async fn get_backend(&self, id: BackendId) -> Result<WooBackend, PortError> {
            self.backends
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Backend", id))
        }

        async fn list_backends(&self) -> Result<Vec<WooBackend>, PortError> {
            let mut backends: Vec<_> = self.backends.read().await.values().cloned().collect();
            backends.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(backends)
        }

        async fn save_backend(&self, backend: &WooBackend) -> Result<(), PortError> {
            self.backends.write().await.insert(backend.id, backend.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl CountryPort for InMemoryStore {
        async fn get_country(&self, id: CountryId) -> Result<Country, PortError> {
            self.countries
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Country", id))
        }

        async fn save_country(&self, country: &Country) -> Result<(), PortError> {
            self.countries.write().await.insert(country.id, country.clone());
            Ok(())
        }

        async fn set_sync_settings(
            &self,
            id: CountryId,
            sync_data: bool,
            woo_backend_id: Option<BackendId>,
        ) -> Result<Country, PortError> {
            let mut countries = self.countries.write().await;
            let country = countries
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Country", id))?;
            country.sync_data = sync_data;
            country.woo_backend_id = woo_backend_id;
            Ok(country.clone())
        }

        async fn find_marked_for_sync(&self, backend_id: BackendId) -> Result<Vec<Country>, PortError> {
            let mut countries: Vec<_> = self
                .countries
                .read()
                .await
                .values()
                .filter(|c| c.is_exportable_to(backend_id))
                .cloned()
                .collect();
            countries.sort_by(|a, b| a.code.cmp(&b.code));
            Ok(countries)
        }

        async fn delete_country(&self, id: CountryId) -> Result<(), PortError> {
            if self.countries.write().await.remove(&id).is_none() {
                return Err(PortError::not_found("Country", id));
            }
            self.bindings.write().await.retain(|_, b| b.odoo_id != id);
            Ok(())
        }
    }

    #[async_trait]
    impl ShippingZoneBindingPort for InMemoryStore {
        async fn get_binding(&self, id: BindingId) -> Result<ShippingZoneBinding, PortError> {
            self.bindings
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Binding", id))
        }

        async fn bindings_for_country(
            &self,
            country_id: CountryId,
        ) -> Result<Vec<ShippingZoneBinding>, PortError> {
            Ok(self
                .bindings
                .read()
                .await
                .values()
                .filter(|b| b.odoo_id == country_id)
                .cloned()
                .collect())
        }

        async fn find_binding(
            &self,
            country_id: CountryId,
            backend_id: BackendId,
        ) -> Result<Option<ShippingZoneBinding>, PortError> {
            Ok(self
                .bindings
                .read()
                .await
                .values()
                .find(|b| b.odoo_id == country_id && b.backend_id == Some(backend_id))
                .cloned())
        }

        async fn create_binding(
            &self,
            country_id: CountryId,
            backend_id: BackendId,
        ) -> Result<ShippingZoneBinding, PortError> {
            if !self.countries.read().await.contains_key(&country_id) {
                return Err(PortError::not_found("Country", country_id));
            }
            let mut bindings = self.bindings.write().await;
            if bindings
                .values()
                .any(|b| b.odoo_id == country_id && b.backend_id == Some(backend_id))
            {
                return Err(PortError::conflict(format!(
                    "{country_id} is already bound to {backend_id}"
                )));
            }
            let binding = ShippingZoneBinding::new(country_id, backend_id);
            bindings.insert(binding.id, binding.clone());
            Ok(binding)
        }

        async fn record_export(
            &self,
            id: BindingId,
            external_id: i64,
            sync_date: DateTime<Utc>,
        ) -> Result<ShippingZoneBinding, PortError> {
            let mut bindings = self.bindings.write().await;
            let binding = bindings
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Binding", id))?;
            binding.mark_exported(external_id, sync_date);
            Ok(binding.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::InMemoryStore;
    use super::*;

    fn backend() -> WooBackend {
        WooBackend::new("Shop", "https://shop.example.com", "ck", "cs")
    }

    #[tokio::test]
    async fn test_create_and_find_binding() {
        let backend = backend();
        let country = Country::new("Spain", "ES");
        let store = InMemoryStore::with_records(vec![backend.clone()], vec![country.clone()]).await;

        let binding = store.create_binding(country.id, backend.id).await.unwrap();
        let found = store.find_binding(country.id, backend.id).await.unwrap();
        assert_eq!(found, Some(binding));
    }

    #[tokio::test]
    async fn test_duplicate_binding_conflicts() {
        let backend = backend();
        let country = Country::new("Spain", "ES");
        let store = InMemoryStore::with_records(vec![backend.clone()], vec![country.clone()]).await;

        store.create_binding(country.id, backend.id).await.unwrap();
        let err = store.create_binding(country.id, backend.id).await.unwrap_err();
        assert!(matches!(err, PortError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let backend = backend();
        let country = Country::new("Spain", "ES");
        let store = InMemoryStore::with_records(vec![backend.clone()], vec![country.clone()]).await;

        let first = store.get_or_create_binding(country.id, backend.id).await.unwrap();
        let second = store.get_or_create_binding(country.id, backend.id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.binding_count().await, 1);
    }

    #[tokio::test]
    async fn test_binding_requires_country() {
        let store = InMemoryStore::new();
        let err = store
            .create_binding(CountryId::new(), BackendId::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_country_cascades_to_bindings() {
        let first = backend();
        let second = WooBackend::new("Outlet", "https://outlet.example.com", "ck", "cs");
        let country = Country::new("Italy", "IT");
        let other = Country::new("Malta", "MT");
        let store = InMemoryStore::with_records(
            vec![first.clone(), second.clone()],
            vec![country.clone(), other.clone()],
        )
        .await;

        store.create_binding(country.id, first.id).await.unwrap();
        store.create_binding(country.id, second.id).await.unwrap();
        let kept = store.create_binding(other.id, first.id).await.unwrap();
        assert_eq!(store.bindings_for_country(country.id).await.unwrap().len(), 2);

        store.delete_country(country.id).await.unwrap();

        assert!(store.bindings_for_country(country.id).await.unwrap().is_empty());
        assert_eq!(store.get_binding(kept.id).await.unwrap(), kept);
    }

    #[tokio::test]
    async fn test_find_marked_for_sync() {
        let backend = backend();
        let marked = Country::new("Portugal", "PT").mark_for_sync(backend.id);
        let unmarked = Country::new("Greece", "GR");
        let mut without_backend = Country::new("Cyprus", "CY");
        without_backend.sync_data = true;

        let store = InMemoryStore::with_records(
            vec![backend.clone()],
            vec![marked.clone(), unmarked, without_backend],
        )
        .await;

        let found = store.find_marked_for_sync(backend.id).await.unwrap();
        assert_eq!(found, vec![marked]);
    }

    #[tokio::test]
    async fn test_set_sync_settings() {
        let backend = backend();
        let country = Country::new("Norway", "NO");
        let store = InMemoryStore::with_records(vec![backend.clone()], vec![country.clone()]).await;

        let updated = store
            .set_sync_settings(country.id, true, Some(backend.id))
            .await
            .unwrap();
        assert!(updated.is_exportable_to(backend.id));
    }
}
