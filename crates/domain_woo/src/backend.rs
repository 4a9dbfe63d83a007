//! WooCommerce backends
//!
//! A backend is the configured connection to one WooCommerce store. Every
//! binding points at the backend it is synchronized with.

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::BackendId;

use crate::error::ConnectorError;

/// Default REST API namespace
pub const DEFAULT_API_VERSION: &str = "wc/v3";

/// Connection settings of one WooCommerce store
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WooBackend {
    pub id: BackendId,
    #[validate(length(min = 1))]
    pub name: String,
    /// Base URL of the store, e.g. "https://shop.example.com"
    #[validate(url)]
    pub location: String,
    #[validate(length(min = 1))]
    pub consumer_key: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 1))]
    pub consumer_secret: String,
    /// REST namespace, e.g. "wc/v3"
    #[validate(length(min = 1))]
    pub version: String,
    /// Reject invalid TLS certificates
    pub verify_ssl: bool,
}

impl WooBackend {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            id: BackendId::new(),
            name: name.into(),
            location: location.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            version: DEFAULT_API_VERSION.to_string(),
            verify_ssl: true,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Root of the versioned REST API, without a trailing slash
    pub fn api_base_url(&self) -> String {
        format!(
            "{}/wp-json/{}",
            self.location.trim_end_matches('/'),
            self.version.trim_matches('/')
        )
    }

    /// Validates the settings before any call is made with them
    pub fn ensure_valid(&self) -> Result<(), ConnectorError> {
        self.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_url() {
        let backend = WooBackend::new("Shop", "https://shop.example.com/", "ck", "cs");
        assert_eq!(backend.api_base_url(), "https://shop.example.com/wp-json/wc/v3");

        let backend = backend.with_version("/wc/v2/");
        assert_eq!(backend.api_base_url(), "https://shop.example.com/wp-json/wc/v2");
    }

    #[test]
    fn test_valid_backend() {
        let backend = WooBackend::new("Shop", "https://shop.example.com", "ck_1", "cs_1");
        assert!(backend.ensure_valid().is_ok());
    }

    #[test]
    fn test_invalid_location_is_rejected() {
        let backend = WooBackend::new("Shop", "not a url", "ck_1", "cs_1");
        let err = backend.ensure_valid().unwrap_err();
        assert!(matches!(err, ConnectorError::Validation(_)));
    }

    #[test]
    fn test_missing_credentials_are_rejected() {
        let backend = WooBackend::new("Shop", "https://shop.example.com", "", "cs_1");
        assert!(backend.ensure_valid().is_err());
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let backend = WooBackend::new("Shop", "https://shop.example.com", "ck_1", "cs_secret");
        let json = serde_json::to_string(&backend).unwrap();
        assert!(!json.contains("cs_secret"));
        assert!(json.contains("ck_1"));
    }
}
