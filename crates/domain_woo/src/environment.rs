//! Connector environment and work contexts
//!
//! The environment owns what every job shares: the storage ports, the
//! transport factory and the component registry. `work_on` narrows it to
//! one backend and one model, yielding a [`WorkContext`] from which
//! components are requested by usage.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use core_kernel::{BackendId, ComponentKey, ComponentRegistry};

use crate::adapter::{ShippingZoneAdapter, TransportFactory, WooTransport};
use crate::backend::WooBackend;
use crate::binding::SHIPPING_ZONE_MODEL;
use crate::error::ConnectorError;
use crate::exporter::{Exporter, ShippingZoneExporter};
use crate::jobs::SHIPPING_ZONE_EXPORTER;
use crate::ports::{BackendPort, CountryPort, ShippingZoneBindingPort};

/// Exporters by model and usage
pub type ExporterRegistry = ComponentRegistry<WorkContext, Box<dyn Exporter>>;

/// Storage ports used by the connector
#[derive(Clone)]
pub struct ConnectorPorts {
    pub backends: Arc<dyn BackendPort>,
    pub countries: Arc<dyn CountryPort>,
    pub bindings: Arc<dyn ShippingZoneBindingPort>,
}

impl ConnectorPorts {
    /// Uses one adapter for all three ports
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: BackendPort + CountryPort + ShippingZoneBindingPort,
    {
        Self {
            backends: store.clone(),
            countries: store.clone(),
            bindings: store,
        }
    }
}

/// Registers the stock components
pub fn default_components() -> ExporterRegistry {
    let mut registry = ExporterRegistry::new();
    registry.register(SHIPPING_ZONE_MODEL, SHIPPING_ZONE_EXPORTER, |work| {
        Box::new(ShippingZoneExporter::new(work.clone())) as Box<dyn Exporter>
    });
    registry
}

/// Shared state of the connector
#[derive(Clone)]
pub struct ConnectorEnvironment {
    ports: ConnectorPorts,
    transports: Arc<dyn TransportFactory>,
    components: Arc<ExporterRegistry>,
}

impl ConnectorEnvironment {
    /// Creates an environment with the stock components
    pub fn new(ports: ConnectorPorts, transports: Arc<dyn TransportFactory>) -> Self {
        Self::with_components(ports, transports, default_components())
    }

    pub fn with_components(
        ports: ConnectorPorts,
        transports: Arc<dyn TransportFactory>,
        components: ExporterRegistry,
    ) -> Self {
        Self {
            ports,
            transports,
            components: Arc::new(components),
        }
    }

    pub fn ports(&self) -> &ConnectorPorts {
        &self.ports
    }

    pub fn components(&self) -> &ExporterRegistry {
        &self.components
    }

    /// Opens a work context on `model` for the backend `backend_id`
    ///
    /// The backend settings are validated and a transport is built for
    /// them before any component runs.
    pub async fn work_on(
        &self,
        backend_id: BackendId,
        model: &str,
    ) -> Result<WorkContext, ConnectorError> {
        let backend = self.ports.backends.get_backend(backend_id).await?;
        backend.ensure_valid()?;
        let transport = self
            .transports
            .for_backend(&backend)
            .map_err(ConnectorError::Transport)?;

        debug!(backend = %backend.name, model, "Opened work context");
        Ok(WorkContext {
            backend: Arc::new(backend),
            model: model.to_string(),
            transport,
            ports: self.ports.clone(),
            components: self.components.clone(),
        })
    }
}

impl fmt::Debug for ConnectorEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorEnvironment")
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}

/// One backend, one model, and everything needed to work on them
#[derive(Clone)]
pub struct WorkContext {
    pub backend: Arc<WooBackend>,
    pub model: String,
    pub transport: Arc<dyn WooTransport>,
    pub ports: ConnectorPorts,
    components: Arc<ExporterRegistry>,
}

impl WorkContext {
    /// Builds the component registered for this model under `usage`
    pub fn component(&self, usage: &str) -> Result<Box<dyn Exporter>, ConnectorError> {
        self.components
            .resolve(self, &self.model, usage)
            .ok_or_else(|| ConnectorError::ComponentNotFound(ComponentKey::new(&self.model, usage)))
    }

    pub fn shipping_zone_adapter(&self) -> ShippingZoneAdapter {
        ShippingZoneAdapter::new(self.transport.clone())
    }
}

impl fmt::Debug for WorkContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkContext")
            .field("backend", &self.backend.name)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
