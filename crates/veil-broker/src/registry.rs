//! In-memory broker definition registry with query support.

use crate::{
    builtin::default_brokers,
    definition::{BrokerCategory, BrokerDefinition},
    directory::BrokerDirectory,
    error::Result,
    loader::BrokerLoader,
};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};
use veil_core::BrokerId;

/// In-memory cache of broker definitions with query capabilities.
///
/// Definitions are kept ordered by ID so listings are stable.
#[derive(Clone)]
pub struct BrokerRegistry {
    /// Cached broker definitions, indexed by broker ID
    definitions: Arc<RwLock<BTreeMap<BrokerId, BrokerDefinition>>>,
}

impl BrokerRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Create a registry holding the built-in broker set.
    #[must_use]
    pub fn with_defaults() -> Self {
        let definitions = default_brokers()
            .into_iter()
            .map(|definition| (definition.id().clone(), definition))
            .collect::<BTreeMap<_, _>>();

        debug!(count = definitions.len(), "loaded built-in broker definitions");

        Self {
            definitions: Arc::new(RwLock::new(definitions)),
        }
    }

    /// Create a registry and load all definitions from the given loader.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn load_from(loader: &BrokerLoader) -> Result<Self> {
        let registry = Self::new();
        registry.reload(loader)?;
        Ok(registry)
    }

    /// Reload all broker definitions from the loader.
    ///
    /// This replaces the current cache with freshly loaded definitions.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn reload(&self, loader: &BrokerLoader) -> Result<()> {
        let definitions = loader.load_all()?;

        let mut cache = self
            .definitions
            .write()
            .expect("acquire write lock on definitions");

        cache.clear();
        for definition in definitions {
            cache.insert(definition.id().clone(), definition);
        }

        info!(count = cache.len(), "reloaded broker definitions");

        Ok(())
    }

    /// Get all broker definitions, ordered by ID.
    #[must_use]
    pub fn get_all(&self) -> Vec<BrokerDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache.values().cloned().collect()
    }

    /// Query brokers by category.
    #[must_use]
    pub fn get_by_category(&self, category: BrokerCategory) -> Vec<BrokerDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache
            .values()
            .filter(|def| def.category() == category)
            .cloned()
            .collect()
    }

    /// Brokers that carry a request template, ordered by ID.
    #[must_use]
    pub fn templates(&self) -> Vec<BrokerDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache
            .values()
            .filter(|def| def.template().is_some())
            .cloned()
            .collect()
    }

    /// Get the total number of brokers in the registry.
    #[must_use]
    pub fn count(&self) -> usize {
        self.definitions
            .read()
            .expect("acquire read lock on definitions")
            .len()
    }
}

impl Default for BrokerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerDirectory for BrokerRegistry {
    fn lookup(&self, broker_id: &BrokerId) -> Option<BrokerDefinition> {
        self.definitions
            .read()
            .expect("acquire read lock on definitions")
            .get(broker_id)
            .cloned()
    }

    fn list(&self) -> Vec<BrokerDefinition> {
        self.get_all()
    }
}
