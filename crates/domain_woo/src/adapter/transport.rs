//! Transport contract shared by every WooCommerce adapter
//!
//! A transport performs one call against the store: an HTTP verb, a
//! resource path relative to the versioned API root (e.g.
//! `shipping/zones/4`) and a JSON argument. It returns the decoded JSON
//! response. Remote-side failures surface as `TransportError::Fault`
//! carrying the remote fault code.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::backend::WooBackend;

/// Fault code WooCommerce answers with when the record does not exist
pub const FAULT_RECORD_NOT_FOUND: i64 = 102;

/// HTTP verb of a transport call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// GET and DELETE carry their arguments in the query string
    pub fn uses_query(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "delete" => Ok(HttpMethod::Delete),
            other => Err(TransportError::InvalidRequest(format!(
                "unsupported HTTP method '{other}'"
            ))),
        }
    }
}

/// Errors raised by a transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The store rejected the call
    #[error("Remote fault {code}: {message}")]
    Fault {
        code: i64,
        message: String,
    },

    /// The request could not be sent or the response could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub fn fault(code: i64, message: impl Into<String>) -> Self {
        TransportError::Fault {
            code,
            message: message.into(),
        }
    }

    pub fn fault_code(&self) -> Option<i64> {
        match self {
            TransportError::Fault { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Connection problems, throttling and server-side faults
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Http(error) => error.is_timeout() || error.is_connect(),
            TransportError::Fault { code, .. } => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }
}

/// One round trip against a WooCommerce store
#[async_trait]
pub trait WooTransport: Send + Sync {
    async fn call(
        &self,
        method: HttpMethod,
        resource: &str,
        arguments: Value,
    ) -> Result<Value, TransportError>;
}

/// Builds the transport used to talk to a given backend
pub trait TransportFactory: Send + Sync {
    fn for_backend(&self, backend: &WooBackend) -> Result<Arc<dyn WooTransport>, TransportError>;
}
