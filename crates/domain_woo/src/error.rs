//! Connector errors
//!
//! `ConnectorError` is what adapters, exporters and services return. Remote
//! failures arrive as `TransportError`; the shipping zone adapter turns the
//! WooCommerce "record not found" fault into `MissingOnBackend` and passes
//! every other transport error through untouched.

use thiserror::Error;

use core_kernel::{ComponentKey, CoreError, JobError, PortError};

use crate::adapter::TransportError;

/// Errors raised by the connector
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The record does not exist on the WooCommerce store (fault 102)
    #[error("Record missing on WooCommerce backend: {resource} ({message})")]
    MissingOnBackend {
        resource: String,
        message: String,
    },

    /// Any other remote failure, unchanged
    #[error("Transport error: {0}")]
    Transport(#[source] TransportError),

    #[error(transparent)]
    Port(#[from] PortError),

    /// Precondition failures such as a non-singleton selection
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Nothing registered for the requested model and usage
    #[error("No component registered for {0}")]
    ComponentNotFound(ComponentKey),

    /// The remote answered with something the connector cannot interpret
    #[error("Invalid response from WooCommerce: {0}")]
    InvalidResponse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConnectorError {
    pub fn missing_on_backend(resource: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectorError::MissingOnBackend {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        ConnectorError::InvalidResponse(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ConnectorError::Validation(message.into())
    }

    /// Returns true for the translated fault 102
    pub fn is_missing_on_backend(&self) -> bool {
        matches!(self, ConnectorError::MissingOnBackend { .. })
    }

    /// Returns true if running the same operation again may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ConnectorError::Transport(error) => error.is_transient(),
            ConnectorError::Port(error) => error.is_transient(),
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for ConnectorError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ConnectorError::Validation(errors.to_string())
    }
}

impl From<ConnectorError> for JobError {
    fn from(error: ConnectorError) -> Self {
        if error.is_retryable() {
            JobError::retryable(error.to_string())
        } else {
            JobError::permanent(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_on_backend_is_permanent() {
        let error = ConnectorError::missing_on_backend("shipping/zones/4", "Invalid ID.");
        assert!(error.is_missing_on_backend());
        assert!(!error.is_retryable());
        assert!(!JobError::from(error).retryable);
    }

    #[test]
    fn test_server_fault_is_retryable() {
        let error = ConnectorError::Transport(TransportError::fault(503, "maintenance"));
        assert!(error.is_retryable());
        assert!(JobError::from(error).retryable);
    }

    #[test]
    fn test_ensure_one_is_permanent() {
        let error = ConnectorError::from(CoreError::EnsureOne {
            model: "woo.shipping.zone".to_string(),
            count: 2,
        });
        assert!(!error.is_retryable());
        assert!(error.to_string().contains("got 2 records"));
    }
}
