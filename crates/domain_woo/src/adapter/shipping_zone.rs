//! Shipping zone adapter
//!
//! Translates search/create/write/existence-check into calls against the
//! `shipping/zones` resource. The adapter holds no state between calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument, warn};

use crate::adapter::transport::{HttpMethod, TransportError, WooTransport, FAULT_RECORD_NOT_FOUND};
use crate::error::ConnectorError;

/// Timestamp format of the `updated_at` search filters
pub const WOO_DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Adapter for the `shipping/zones` resource
#[derive(Clone)]
pub struct ShippingZoneAdapter {
    transport: Arc<dyn WooTransport>,
}

impl ShippingZoneAdapter {
    pub const RESOURCE: &'static str = "shipping/zones";

    pub fn new(transport: Arc<dyn WooTransport>) -> Self {
        Self { transport }
    }

    /// Performs a transport call, translating fault 102
    ///
    /// Every other error is returned as `ConnectorError::Transport` with the
    /// original error inside.
    pub async fn call(
        &self,
        method: HttpMethod,
        resource: &str,
        arguments: Value,
    ) -> Result<Value, ConnectorError> {
        match self.transport.call(method, resource, arguments).await {
            Ok(result) => Ok(result),
            Err(TransportError::Fault { code, message }) if code == FAULT_RECORD_NOT_FOUND => {
                debug!(resource, "Shipping zone missing on backend");
                Err(ConnectorError::missing_on_backend(resource, message))
            }
            Err(error) => Err(ConnectorError::Transport(error)),
        }
    }

    /// Searches zones and returns their ids in response order
    ///
    /// A record whose `id` is missing or not a JSON integer (a string such
    /// as `"5"`, a float, `null`) yields `None` at its position; ids are
    /// never coerced.
    #[instrument(skip(self, filters))]
    pub async fn search(
        &self,
        method: HttpMethod,
        filters: Option<Map<String, Value>>,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> Result<Vec<Option<i64>>, ConnectorError> {
        let filters = search_filters(filters, from_date, to_date);
        let response = self
            .call(method, Self::RESOURCE, json!([Value::Object(filters)]))
            .await?;

        let zones = response.as_array().ok_or_else(|| {
            ConnectorError::invalid_response(format!(
                "expected a list of shipping zones, got {response}"
            ))
        })?;

        let ids: Vec<Option<i64>> = zones
            .iter()
            .map(|zone| zone.get("id").and_then(Value::as_i64))
            .collect();

        let missing = ids.iter().filter(|id| id.is_none()).count();
        if missing > 0 {
            warn!(missing, total = ids.len(), "Shipping zones without an id in search response");
        }
        Ok(ids)
    }

    /// Creates a zone; returns the raw response
    #[instrument(skip(self, data))]
    pub async fn create(&self, data: Value) -> Result<Value, ConnectorError> {
        self.call(HttpMethod::Post, Self::RESOURCE, json!({ "shipping_zone": data }))
            .await
    }

    /// Updates zone `id`; returns the raw response
    #[instrument(skip(self, data))]
    pub async fn write(&self, id: i64, data: Value) -> Result<Value, ConnectorError> {
        self.call(
            HttpMethod::Put,
            &Self::record_path(id),
            json!({ "shipping_zone": data }),
        )
        .await
    }

    /// Reads zone `external_id`; returns the raw response
    ///
    /// Without filters an empty object is sent, built fresh for this call.
    #[instrument(skip(self, filters))]
    pub async fn is_woo_record(
        &self,
        external_id: i64,
        filters: Option<Map<String, Value>>,
    ) -> Result<Value, ConnectorError> {
        let filters = filters.unwrap_or_default();
        self.call(
            HttpMethod::Get,
            &Self::record_path(external_id),
            Value::Object(filters),
        )
        .await
    }

    /// Existence check as a boolean
    ///
    /// A missing record is `false`; any other error is returned.
    pub async fn record_exists(&self, external_id: i64) -> Result<bool, ConnectorError> {
        match self.is_woo_record(external_id, None).await {
            Ok(result) => Ok(is_truthy(&result)),
            Err(error) if error.is_missing_on_backend() => Ok(false),
            Err(error) => Err(error),
        }
    }

    fn record_path(id: i64) -> String {
        format!("{}/{}", Self::RESOURCE, id)
    }
}

/// Builds the filter object of a search
///
/// `updated_at.from` and `updated_at.to` are only present when the
/// matching date is given.
pub fn search_filters(
    filters: Option<Map<String, Value>>,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
) -> Map<String, Value> {
    let mut filters = filters.unwrap_or_default();

    for (key, date) in [("from", from_date), ("to", to_date)] {
        let Some(date) = date else { continue };
        let updated_at = filters
            .entry("updated_at")
            .or_insert_with(|| Value::Object(Map::new()));
        if !updated_at.is_object() {
            *updated_at = Value::Object(Map::new());
        }
        if let Value::Object(range) = updated_at {
            range.insert(
                key.to_string(),
                Value::String(date.format(WOO_DATETIME_FORMAT).to_string()),
            );
        }
    }

    filters
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
