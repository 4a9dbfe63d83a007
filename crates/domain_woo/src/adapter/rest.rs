//! REST transport for the WooCommerce API
//!
//! Calls go to `{location}/wp-json/{version}/{resource}` authenticated with
//! the backend's consumer key and secret (HTTP basic auth). POST and PUT
//! send the arguments as a JSON body; GET and DELETE flatten them into the
//! query string with bracket notation, so `{"updated_at": {"from": "…"}}`
//! becomes `updated_at[from]=…`.
//!
//! Error responses become `TransportError::Fault`. A 404 is reported with
//! fault code 102 (record not found); any other status keeps the HTTP
//! status as its code.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::adapter::transport::{
    HttpMethod, TransportError, TransportFactory, WooTransport, FAULT_RECORD_NOT_FOUND,
};
use crate::backend::WooBackend;

/// Default timeout for a single request
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// `reqwest`-backed transport bound to one backend
#[derive(Debug, Clone)]
pub struct RestTransport {
    client: Client,
    api_base_url: String,
    consumer_key: String,
    consumer_secret: String,
}

impl RestTransport {
    /// Creates a transport for `backend`
    pub fn new(backend: &WooBackend, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!backend.verify_ssl)
            .build()?;

        Ok(Self {
            client,
            api_base_url: backend.api_base_url(),
            consumer_key: backend.consumer_key.clone(),
            consumer_secret: backend.consumer_secret.clone(),
        })
    }

    /// Full URL of a resource path
    pub fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}", self.api_base_url, resource.trim_start_matches('/'))
    }
}

#[async_trait]
impl WooTransport for RestTransport {
    #[instrument(skip(self, arguments), fields(method = %method))]
    async fn call(
        &self,
        method: HttpMethod,
        resource: &str,
        arguments: Value,
    ) -> Result<Value, TransportError> {
        let url = self.endpoint(resource);

        let request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };
        let request = request.basic_auth(&self.consumer_key, Some(&self.consumer_secret));
        let request = if method.uses_query() {
            request.query(&flatten_query(&arguments)?)
        } else {
            request.json(&arguments)
        };

        debug!(url = %url, "Sending WooCommerce request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(url = %url, status = %status, "Received WooCommerce response");

        if !status.is_success() {
            let fault = fault_from_response(status, &body);
            warn!(url = %url, status = %status, error = %fault, "WooCommerce request failed");
            return Err(fault);
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Builds a `RestTransport` per backend with a shared timeout
#[derive(Debug, Clone)]
pub struct RestTransportFactory {
    timeout: Duration,
}

impl RestTransportFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for RestTransportFactory {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl TransportFactory for RestTransportFactory {
    fn for_backend(&self, backend: &WooBackend) -> Result<Arc<dyn WooTransport>, TransportError> {
        Ok(Arc::new(RestTransport::new(backend, self.timeout)?))
    }
}

/// Flattens call arguments into query pairs
///
/// Accepts `null`, an object, or a one-element array holding an object
/// (the shape search calls use).
pub fn flatten_query(arguments: &Value) -> Result<Vec<(String, String)>, TransportError> {
    let mut pairs = Vec::new();
    match arguments {
        Value::Null => {}
        Value::Array(items) if items.is_empty() => {}
        Value::Array(items) if items.len() == 1 => return flatten_query(&items[0]),
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(key.clone(), value, &mut pairs);
            }
        }
        other => {
            return Err(TransportError::InvalidRequest(format!(
                "query arguments must be an object, got {other}"
            )))
        }
    }
    Ok(pairs)
}

fn flatten_into(prefix: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::String(s) => pairs.push((prefix, s.clone())),
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(format!("{prefix}[{key}]"), nested, pairs);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_into(format!("{prefix}[]"), item, pairs);
            }
        }
        other => pairs.push((prefix, other.to_string())),
    }
}

fn fault_from_response(status: StatusCode, body: &str) -> TransportError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect());

    let code = if status == StatusCode::NOT_FOUND {
        FAULT_RECORD_NOT_FOUND
    } else {
        i64::from(status.as_u16())
    };
    TransportError::fault(code, message)
}
