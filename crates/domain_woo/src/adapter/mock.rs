//! Recording transport for tests
//!
//! Every call is recorded; responses are served from a FIFO of scripted
//! results. When the script is empty a call answers `null`.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::adapter::transport::{HttpMethod, TransportError, TransportFactory, WooTransport};
use crate::backend::WooBackend;

/// A call received by the `RecordingTransport`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub resource: String,
    pub arguments: Value,
}

/// In-memory transport that records calls and replays scripted results
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response
    pub async fn push_response(&self, value: Value) {
        self.responses.lock().await.push_back(Ok(value));
    }

    /// Queues a remote fault
    pub async fn push_fault(&self, code: i64, message: &str) {
        self.responses
            .lock()
            .await
            .push_back(Err(TransportError::fault(code, message)));
    }

    /// Queues an arbitrary error
    pub async fn push_error(&self, error: TransportError) {
        self.responses.lock().await.push_back(Err(error));
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl WooTransport for RecordingTransport {
    async fn call(
        &self,
        method: HttpMethod,
        resource: &str,
        arguments: Value,
    ) -> Result<Value, TransportError> {
        self.calls.lock().await.push(RecordedCall {
            method,
            resource: resource.to_string(),
            arguments,
        });
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }
}

/// Hands out the same transport for every backend
#[derive(Clone)]
pub struct StaticTransportFactory {
    transport: Arc<dyn WooTransport>,
}

impl StaticTransportFactory {
    pub fn new(transport: Arc<dyn WooTransport>) -> Self {
        Self { transport }
    }
}

impl TransportFactory for StaticTransportFactory {
    fn for_backend(&self, _backend: &WooBackend) -> Result<Arc<dyn WooTransport>, TransportError> {
        Ok(self.transport.clone())
    }
}
