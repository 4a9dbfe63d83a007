//! WooCommerce connector - shipping zones
//!
//! Exports internal countries to WooCommerce as shipping zones:
//! - `backend`: connection settings of a store
//! - `country` / `binding`: the internal record and its per-backend binding
//! - `adapter`: transports and the `shipping/zones` adapter
//! - `environment` / `exporter`: work contexts and the components resolved in them
//! - `jobs` / `service`: queued exports and the operations that schedule them

pub mod adapter;
pub mod backend;
pub mod binding;
pub mod country;
pub mod environment;
pub mod error;
pub mod exporter;
pub mod jobs;
pub mod ports;
pub mod service;

pub use adapter::{
    HttpMethod, RestTransport, RestTransportFactory, ShippingZoneAdapter, TransportError,
    TransportFactory, WooTransport, FAULT_RECORD_NOT_FOUND, WOO_DATETIME_FORMAT,
};
pub use backend::{WooBackend, DEFAULT_API_VERSION};
pub use binding::{ShippingZoneBinding, ShippingZoneRecord, SHIPPING_ZONE_MODEL};
pub use country::{Country, COUNTRY_MODEL};
pub use environment::{
    default_components, ConnectorEnvironment, ConnectorPorts, ExporterRegistry, WorkContext,
};
pub use error::ConnectorError;
pub use exporter::{ExportOutcome, Exporter, ShippingZoneExporter};
pub use jobs::{
    export_shipping_zone, register_actions, register_jobs, ExportRecordPayload,
    ExportShippingZoneJob, UnwrapBindingAction, EXPORT_RECORD_JOB, RELATED_ACTION_UNWRAP_BINDING,
    SHIPPING_ZONE_EXPORTER, WOO_CHANNEL,
};
pub use ports::{BackendPort, CountryPort, ShippingZoneBindingPort, ShippingZoneBindingPortExt};
pub use service::ShippingZoneService;
