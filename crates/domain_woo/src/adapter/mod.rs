//! WooCommerce adapters
//!
//! - `transport`: the `WooTransport` contract and its error type
//! - `rest`: the `reqwest` implementation used in production
//! - `shipping_zone`: the `shipping/zones` adapter
//! - `mock`: a recording transport for tests (feature `mock`)

pub mod transport;
pub mod rest;
pub mod shipping_zone;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use transport::{
    HttpMethod, TransportError, TransportFactory, WooTransport, FAULT_RECORD_NOT_FOUND,
};
pub use rest::{RestTransport, RestTransportFactory};
pub use shipping_zone::{search_filters, ShippingZoneAdapter, WOO_DATETIME_FORMAT};
