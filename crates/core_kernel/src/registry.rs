//! Component Registry
//!
//! Connector components (exporters, importers, adapters) are looked up by
//! the model they apply on and the usage they declare, e.g.
//! `("woo.shipping.zone", "shipping.zone.exporter")`. The registry maps each
//! key to a constructor that builds the component for a given work context.
//!
//! # Usage
//!
//! ```rust,ignore
//! use core_kernel::registry::ComponentRegistry;
//!
//! let mut registry: ComponentRegistry<WorkContext, Box<dyn Exporter>> =
//!     ComponentRegistry::new();
//!
//! registry.register("woo.shipping.zone", "shipping.zone.exporter", |work| {
//!     Box::new(ShippingZoneExporter::new(work.clone())) as Box<dyn Exporter>
//! });
//!
//! let exporter = registry.resolve(&work, "woo.shipping.zone", "shipping.zone.exporter");
//! ```
//!
//! Registering the same key twice replaces the previous constructor, so a
//! deployment can override a stock component.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

/// Lookup key for a component: the model it applies on and its usage
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey {
    /// Model name, e.g. "woo.shipping.zone"
    pub model: String,
    /// Declared capability, e.g. "shipping.zone.exporter"
    pub usage: String,
}

impl ComponentKey {
    pub fn new(model: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            usage: usage.into(),
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.model, self.usage)
    }
}

type Factory<Ctx, C> = Arc<dyn Fn(&Ctx) -> C + Send + Sync>;

/// Lookup table from component key to constructor
pub struct ComponentRegistry<Ctx, C> {
    factories: HashMap<ComponentKey, Factory<Ctx, C>>,
}

impl<Ctx, C> ComponentRegistry<Ctx, C> {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a constructor for `(model, usage)`
    pub fn register<F>(&mut self, model: &str, usage: &str, factory: F) -> &mut Self
    where
        F: Fn(&Ctx) -> C + Send + Sync + 'static,
    {
        let key = ComponentKey::new(model, usage);
        debug!(component = %key, "Registering component");
        self.factories.insert(key, Arc::new(factory));
        self
    }

    /// Builds the component registered for `(model, usage)`
    ///
    /// Returns `None` when nothing is registered for the key.
    pub fn resolve(&self, ctx: &Ctx, model: &str, usage: &str) -> Option<C> {
        self.factories
            .get(&ComponentKey::new(model, usage))
            .map(|factory| factory(ctx))
    }

    /// Returns true if a constructor is registered for `(model, usage)`
    pub fn contains(&self, model: &str, usage: &str) -> bool {
        self.factories.contains_key(&ComponentKey::new(model, usage))
    }

    /// Returns the registered keys in sorted order
    pub fn keys(&self) -> Vec<ComponentKey> {
        let mut keys: Vec<_> = self.factories.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl<Ctx, C> Default for ComponentRegistry<Ctx, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx, C> fmt::Debug for ComponentRegistry<Ctx, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.keys())
            .finish()
    }
}
