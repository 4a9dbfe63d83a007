//! Countries as shipping zones
//!
//! The internal country record is extended with the fields the export
//! needs: whether it should be synchronized and which store it goes to.
//! The bindings of a country (one per backend) are not stored on the
//! country itself; they are read through
//! `ShippingZoneBindingPort::bindings_for_country`.

use serde::{Deserialize, Serialize};

use core_kernel::{BackendId, CountryId};

/// Model name of the internal country record
pub const COUNTRY_MODEL: &str = "res.country";

/// Internal country record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    /// ISO 3166-1 alpha-2 code
    pub code: String,
    /// "Synch with Woo?"
    pub sync_data: bool,
    /// Store the country is exported to
    pub woo_backend_id: Option<BackendId>,
}

impl Country {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: CountryId::new(),
            name: name.into(),
            code: code.into(),
            sync_data: false,
            woo_backend_id: None,
        }
    }

    /// Flags the country for export to `backend_id`
    pub fn mark_for_sync(mut self, backend_id: BackendId) -> Self {
        self.sync_data = true;
        self.woo_backend_id = Some(backend_id);
        self
    }

    /// True when the country is flagged and targets `backend_id`
    ///
    /// A flagged country without a backend is never exported.
    pub fn is_exportable_to(&self, backend_id: BackendId) -> bool {
        self.sync_data && self.woo_backend_id == Some(backend_id)
    }
}
