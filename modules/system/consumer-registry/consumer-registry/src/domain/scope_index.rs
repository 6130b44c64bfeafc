//! Request-path index: namespace -> plugin -> lookup key -> consumer.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use consumer_registry_sdk::ConsumerView;

use super::consumer::Consumer;
use super::error::IndexCollision;
use super::resource_index::ResourceIndex;

type KeyIndex = HashMap<String, Arc<Consumer>>;
type PluginIndex = HashMap<String, KeyIndex>;

/// Derived index, rebuilt in full from a [`ResourceIndex`] and never patched.
#[derive(Debug, Default)]
pub struct ScopeIndex {
    generation: u64,
    namespaces: HashMap<String, PluginIndex>,
    entries: usize,
}

impl ScopeIndex {
    /// Empty index of the given generation.
    #[must_use]
    pub fn empty(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    /// Index every auth config of every consumer in `resources`.
    ///
    /// Within a namespace the first consumer to claim a `(plugin, key)` pair
    /// keeps it; later claimants are skipped and reported as collisions.
    #[must_use]
    pub fn build(generation: u64, resources: &ResourceIndex) -> (Self, Vec<IndexCollision>) {
        let mut index = Self::empty(generation);
        let mut collisions = Vec::new();

        for (namespace, consumers) in resources.namespaces() {
            let mut plugins = PluginIndex::new();
            for consumer in consumers.values() {
                for (plugin, cfg) in consumer.auth_configs() {
                    let key = cfg.index();
                    let keys = plugins.entry(plugin.to_owned()).or_default();
                    if let Some(existing) = keys.get(&key) {
                        let collision = IndexCollision {
                            namespace: namespace.to_owned(),
                            plugin: plugin.to_owned(),
                            key,
                            existing: existing.name().to_owned(),
                            rejected: consumer.name().to_owned(),
                        };
                        warn!(
                            namespace = %collision.namespace,
                            plugin = %collision.plugin,
                            existing = %collision.existing,
                            rejected = %collision.rejected,
                            "{collision}"
                        );
                        collisions.push(collision);
                        continue;
                    }
                    keys.insert(key, Arc::clone(consumer));
                    index.entries += 1;
                }
            }
            index.namespaces.insert(namespace.to_owned(), plugins);
        }

        (index, collisions)
    }

    #[must_use]
    pub fn lookup(&self, namespace: &str, plugin: &str, key: &str) -> Option<&Arc<Consumer>> {
        self.namespaces.get(namespace)?.get(plugin)?.get(key)
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of indexed `(namespace, plugin, key)` entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}
