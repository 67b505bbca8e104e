//! Registration table and per-name instance cache for sub-collectors.
//!
//! A [`Registry`] is filled once at startup and then handed to every [`Orchestrator`] built from it.
//! Instances are constructed the first time they are asked for and shared afterwards, so two
//! orchestrators built from the same registry drive the very same collector objects.
//!
//! [`Orchestrator`]: super::Orchestrator

use super::{
    collector::{
        CollectorConfig,
        CollectorError,
        SubCollector,
    },
    DevicesCollector,
    DnsCollector,
    KeysCollector,
    TailnetSettingsCollector,
    UsersCollector,
};
use crate::metrics::catalog;
use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        Mutex,
        PoisonError,
    },
};

/// Builds a sub-collector from its configuration.
pub type Constructor = fn(CollectorConfig) -> Result<Arc<dyn SubCollector>, CollectorError>;

/// Instantiated sub-collectors keyed by name.
pub type Collectors = BTreeMap<&'static str, Arc<dyn SubCollector>>;

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("Failed to create the {name} collector: {source}")]
    Instantiate {
        name: &'static str,
        #[source]
        source: CollectorError,
    },
}

#[derive(Default)]
pub struct Registry {
    registrations: BTreeMap<&'static str, Constructor>,
    instances: Mutex<Collectors>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the devices, users, keys, dns and tailnet settings collectors.
    pub fn with_default_collectors() -> Self {
        let mut registry = Self::new();
        registry.register(catalog::devices::SUBSYSTEM, DevicesCollector::create);
        registry.register(catalog::users::SUBSYSTEM, UsersCollector::create);
        registry.register(catalog::keys::SUBSYSTEM, KeysCollector::create);
        registry.register(catalog::dns::SUBSYSTEM, DnsCollector::create);
        registry.register(
            catalog::tailnet_settings::SUBSYSTEM,
            TailnetSettingsCollector::create,
        );
        registry
    }

    /// Registers `constructor` under `name`.
    ///
    /// # Panics
    ///
    /// If `name` is already registered. Registration only happens during startup, so a duplicate
    /// is a programming error.
    pub fn register(&mut self, name: &'static str, constructor: Constructor) {
        if self.registrations.insert(name, constructor).is_some() {
            panic!("collector {name} registered twice");
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registrations.keys().copied()
    }

    /// Returns one instance per registered name, constructing and caching the ones that don't
    /// exist yet.
    ///
    /// If any constructor fails nothing new is cached and the first failure is returned.
    pub fn instantiate_all(&self) -> Result<Collectors, RegistryError> {
        let mut instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);

        let mut created = Collectors::new();
        for (&name, constructor) in &self.registrations {
            if instances.contains_key(name) {
                continue;
            }
            let collector = constructor(CollectorConfig::new(name))
                .map_err(|source| RegistryError::Instantiate { name, source })?;
            debug!(collector = name, "Created collector");
            created.insert(name, collector);
        }
        instances.extend(created);

        Ok(instances.clone())
    }
}
