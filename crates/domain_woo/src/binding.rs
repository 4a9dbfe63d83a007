//! Shipping zone bindings
//!
//! A binding links one internal country to its shipping zone on one
//! WooCommerce backend. It holds the country as a foreign key (`odoo_id`);
//! fields of the country are read through [`ShippingZoneRecord`], the
//! binding joined with its country.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use core_kernel::{BackendId, BindingId, CountryId};

use crate::country::Country;
use crate::error::ConnectorError;

/// Model name of the binding
pub const SHIPPING_ZONE_MODEL: &str = "woo.shipping.zone";

/// Link between a country and a WooCommerce shipping zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingZoneBinding {
    pub id: BindingId,
    /// The country this binding extends; deleting it deletes the binding
    pub odoo_id: CountryId,
    pub backend_id: Option<BackendId>,
    /// Zone id on the store, known once exported
    pub external_id: Option<i64>,
    /// Last successful export
    pub sync_date: Option<DateTime<Utc>>,
}

impl ShippingZoneBinding {
    pub fn new(odoo_id: CountryId, backend_id: BackendId) -> Self {
        Self {
            id: BindingId::new(),
            odoo_id,
            backend_id: Some(backend_id),
            external_id: None,
            sync_date: None,
        }
    }

    pub fn is_exported(&self) -> bool {
        self.external_id.is_some()
    }

    /// Records a successful export
    pub fn mark_exported(&mut self, external_id: i64, at: DateTime<Utc>) {
        self.external_id = Some(external_id);
        self.sync_date = Some(at);
    }
}

/// A binding read together with its country
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingZoneRecord {
    pub binding: ShippingZoneBinding,
    pub country: Country,
}

impl ShippingZoneRecord {
    /// Joins `binding` with `country`; they must belong together
    pub fn join(binding: ShippingZoneBinding, country: Country) -> Result<Self, ConnectorError> {
        if binding.odoo_id != country.id {
            return Err(ConnectorError::validation(format!(
                "binding {} belongs to {}, not {}",
                binding.id, binding.odoo_id, country.id
            )));
        }
        Ok(Self { binding, country })
    }

    /// Display name, taken from the country
    pub fn name(&self) -> &str {
        &self.country.name
    }

    pub fn code(&self) -> &str {
        &self.country.code
    }

    /// Payload sent to `shipping/zones`
    pub fn to_payload(&self) -> Value {
        json!({
            "name": self.country.name,
            "order": 0,
        })
    }
}
