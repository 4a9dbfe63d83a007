//! Test Data Builders
//!
//! Builders construct test data with generated defaults, so tests only
//! spell out the fields they care about.

use chrono::{DateTime, Utc};
use fake::faker::address::en::{CountryCode, CountryName};
use fake::faker::company::en::CompanyName;
use fake::Fake;

use core_kernel::{BackendId, CountryId};
use domain_woo::{Country, ShippingZoneBinding, WooBackend};

/// Builder for countries
pub struct CountryBuilder {
    name: String,
    code: String,
    sync_data: bool,
    woo_backend_id: Option<BackendId>,
}

impl Default for CountryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CountryBuilder {
    /// Creates a builder with a generated name and code
    pub fn new() -> Self {
        Self {
            name: CountryName().fake(),
            code: CountryCode().fake(),
            sync_data: false,
            woo_backend_id: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Flags the country for export to `backend_id`
    pub fn synced_with(mut self, backend_id: BackendId) -> Self {
        self.sync_data = true;
        self.woo_backend_id = Some(backend_id);
        self
    }

    /// Sets the flag without a backend
    pub fn flagged_without_backend(mut self) -> Self {
        self.sync_data = true;
        self.woo_backend_id = None;
        self
    }

    pub fn build(self) -> Country {
        let mut country = Country::new(self.name, self.code);
        country.sync_data = self.sync_data;
        country.woo_backend_id = self.woo_backend_id;
        country
    }
}

/// Builder for shipping zone bindings
pub struct BindingBuilder {
    country_id: CountryId,
    backend_id: BackendId,
    external_id: Option<i64>,
    sync_date: Option<DateTime<Utc>>,
}

impl BindingBuilder {
    pub fn new(country: &Country, backend: &WooBackend) -> Self {
        Self {
            country_id: country.id,
            backend_id: backend.id,
            external_id: None,
            sync_date: None,
        }
    }

    /// Marks the binding as exported under `external_id`
    pub fn exported_as(mut self, external_id: i64) -> Self {
        self.external_id = Some(external_id);
        self.sync_date = Some(Utc::now());
        self
    }

    pub fn build(self) -> ShippingZoneBinding {
        let mut binding = ShippingZoneBinding::new(self.country_id, self.backend_id);
        binding.external_id = self.external_id;
        binding.sync_date = self.sync_date;
        binding
    }
}

/// Builder for backends
pub struct BackendBuilder {
    name: String,
    location: String,
    version: Option<String>,
    verify_ssl: bool,
}

impl Default for BackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendBuilder {
    pub fn new() -> Self {
        Self {
            name: CompanyName().fake(),
            location: "https://shop.example.com".to_string(),
            version: None,
            verify_ssl: true,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn insecure(mut self) -> Self {
        self.verify_ssl = false;
        self
    }

    pub fn build(self) -> WooBackend {
        let mut backend = WooBackend::new(self.name, self.location, "ck_test", "cs_test");
        if let Some(version) = self.version {
            backend = backend.with_version(version);
        }
        backend.verify_ssl = self.verify_ssl;
        backend
    }
}
