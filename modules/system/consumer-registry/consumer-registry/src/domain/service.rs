//! Domain service for the consumer registry.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use consumer_registry_sdk::{PluginProvider, Snapshot};

use super::consumer::Consumer;
use super::resource_index::ResourceIndex;
use super::scope_index::ScopeIndex;
use crate::config::ConsumerRegistryConfig;

/// Outcome of one [`Service::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub generation: u64,
    pub namespaces_synced: usize,
    pub namespaces_pruned: usize,
    pub consumers_reused: usize,
    pub consumers_built: usize,
    pub consumers_rejected: usize,
    pub index_collisions: usize,
}

/// Counters of the published generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub generation: u64,
    pub namespaces: usize,
    pub consumers: usize,
    pub index_entries: usize,
}

/// One published generation: a resource index and the scope index derived from it.
///
/// Readers that need several answers from the same generation hold on to the
/// `Arc` returned by [`Service::current`].
#[derive(Debug, Default)]
pub struct Generation {
    resources: ResourceIndex,
    scopes: ScopeIndex,
}

impl Generation {
    #[must_use]
    pub fn number(&self) -> u64 {
        self.scopes.generation()
    }

    #[must_use]
    pub fn lookup(&self, namespace: &str, plugin: &str, key: &str) -> Option<&Arc<Consumer>> {
        self.scopes.lookup(namespace, plugin, key)
    }

    #[must_use]
    pub fn consumer(&self, namespace: &str, name: &str) -> Option<&Arc<Consumer>> {
        self.resources.consumer(namespace, name)
    }

    #[must_use]
    pub fn resources(&self) -> &ResourceIndex {
        &self.resources
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            generation: self.number(),
            namespaces: self.resources.namespace_count(),
            consumers: self.resources.consumer_count(),
            index_entries: self.scopes.len(),
        }
    }
}

/// Consumer registry service.
///
/// Writers are serialized by `update_lock` and build the next generation
/// privately; readers load the published generation without locking.
pub struct Service {
    provider: Arc<dyn PluginProvider>,
    config: ConsumerRegistryConfig,
    state: ArcSwap<Generation>,
    update_lock: Mutex<()>,
}

impl Service {
    #[must_use]
    pub fn new(provider: Arc<dyn PluginProvider>, config: ConsumerRegistryConfig) -> Self {
        Self {
            provider,
            config,
            state: ArcSwap::from_pointee(Generation::default()),
            update_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ConsumerRegistryConfig {
        &self.config
    }

    /// Apply a control-plane snapshot and publish the next generation.
    ///
    /// Per-consumer failures are logged and counted in the summary; they never
    /// fail the update.
    #[tracing::instrument(skip_all, fields(namespaces = snapshot.len()))]
    pub fn update(&self, snapshot: &Snapshot) -> UpdateSummary {
        let _guard = self.update_lock.lock();

        let current = self.state.load_full();
        let (resources, sync) =
            current
                .resources
                .synced(snapshot, self.provider.as_ref(), &self.config);

        let generation = current.number() + 1;
        let (scopes, collisions) = ScopeIndex::build(generation, &resources);

        self.state.store(Arc::new(Generation { resources, scopes }));

        let summary = UpdateSummary {
            generation,
            namespaces_synced: sync.namespaces_synced,
            namespaces_pruned: sync.namespaces_pruned,
            consumers_reused: sync.reused,
            consumers_built: sync.built,
            consumers_rejected: sync.rejected,
            index_collisions: collisions.len(),
        };
        info!(
            generation,
            reused = summary.consumers_reused,
            built = summary.consumers_built,
            rejected = summary.consumers_rejected,
            collisions = summary.index_collisions,
            "consumer registry updated"
        );
        summary
    }

    /// Currently published generation.
    #[must_use]
    pub fn current(&self) -> Arc<Generation> {
        self.state.load_full()
    }

    #[must_use]
    pub fn lookup(&self, namespace: &str, plugin: &str, key: &str) -> Option<Arc<Consumer>> {
        self.state.load().lookup(namespace, plugin, key).cloned()
    }

    #[must_use]
    pub fn consumer(&self, namespace: &str, name: &str) -> Option<Arc<Consumer>> {
        self.state.load().consumer(namespace, name).cloned()
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        self.state.load().stats()
    }
}
