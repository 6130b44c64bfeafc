//! Source-of-truth mirror of the control plane: namespace -> consumer name -> consumer.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{error, info, warn};

use consumer_registry_sdk::{ConsumerView, NamespaceEntries, PluginProvider, Snapshot, SnapshotEntry};

use super::consumer::{Consumer, ConsumerSpec};
use super::error::DomainError;
use crate::config::ConsumerRegistryConfig;

/// Consumers of one namespace, keyed by snapshot name, in snapshot order.
pub type NamespaceConsumers = IndexMap<String, Arc<Consumer>>;

/// Counters of one synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub namespaces_synced: usize,
    pub namespaces_pruned: usize,
    /// Consumers carried over by reference because their version is unchanged.
    pub reused: usize,
    /// Consumers decoded and initialized in this pass.
    pub built: usize,
    /// Entries dropped because they failed to decode or initialize.
    pub rejected: usize,
}

/// One immutable generation of the resource index.
///
/// Namespaces are shared between generations by `Arc`; a sync only allocates
/// maps for the namespaces present in the snapshot.
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    namespaces: IndexMap<String, Arc<NamespaceConsumers>>,
}

impl ResourceIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn namespace(&self, namespace: &str) -> Option<&NamespaceConsumers> {
        self.namespaces.get(namespace).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn consumer(&self, namespace: &str, name: &str) -> Option<&Arc<Consumer>> {
        self.namespace(namespace).and_then(|consumers| consumers.get(name))
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &NamespaceConsumers)> {
        self.namespaces
            .iter()
            .map(|(ns, consumers)| (ns.as_str(), consumers.as_ref()))
    }

    #[must_use]
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.namespaces.values().map(|c| c.len()).sum()
    }

    /// Build the next generation from `snapshot`.
    ///
    /// Every namespace of the snapshot is replaced as a whole. Consumers whose
    /// version token did not change are reused, all others are decoded and
    /// initialized again; entries that fail are logged and left out.
    /// Namespaces absent from the snapshot are kept unless
    /// `prune_missing_namespaces` is set.
    #[must_use]
    pub fn synced(
        &self,
        snapshot: &Snapshot,
        provider: &dyn PluginProvider,
        config: &ConsumerRegistryConfig,
    ) -> (Self, SyncStats) {
        let mut stats = SyncStats::default();

        let mut namespaces = if config.prune_missing_namespaces {
            self.namespaces
                .iter()
                .filter(|(ns, _)| {
                    let keep = snapshot.contains_namespace(ns);
                    if !keep {
                        info!(namespace = %ns, "namespace missing from snapshot, pruned");
                        stats.namespaces_pruned += 1;
                    }
                    keep
                })
                .map(|(ns, consumers)| (ns.clone(), Arc::clone(consumers)))
                .collect()
        } else {
            self.namespaces.clone()
        };

        let no_entries = NamespaceEntries::new();
        for (namespace, entries) in snapshot.namespaces() {
            let entries = entries.unwrap_or_else(|| {
                warn!(namespace = %namespace, "namespace value is not an object, treated as empty");
                &no_entries
            });
            let current = self.namespace(namespace);
            let consumers = sync_namespace(namespace, entries, current, provider, config, &mut stats);
            namespaces.insert(namespace.to_owned(), Arc::new(consumers));
            stats.namespaces_synced += 1;
        }

        (Self { namespaces }, stats)
    }
}

fn sync_namespace(
    namespace: &str,
    entries: &NamespaceEntries,
    current: Option<&NamespaceConsumers>,
    provider: &dyn PluginProvider,
    config: &ConsumerRegistryConfig,
    stats: &mut SyncStats,
) -> NamespaceConsumers {
    let mut consumers = NamespaceConsumers::with_capacity(entries.len());

    for (name, raw) in entries {
        let version = raw.get("v").and_then(Value::as_str).unwrap_or_default();

        if let Some(existing) = current.and_then(|c| c.get(name))
            && existing.resource_version() == version
        {
            consumers.insert(name.clone(), Arc::clone(existing));
            stats.reused += 1;
            continue;
        }

        match build_consumer(namespace, name, raw, provider) {
            Ok(consumer) => {
                consumers.insert(name.clone(), Arc::new(consumer));
                stats.built += 1;
            }
            Err(err) => {
                stats.rejected += 1;
                if config.log_consumer_payloads {
                    let body = raw.get("d").and_then(Value::as_str).unwrap_or_default();
                    error!(
                        namespace = %namespace,
                        consumer = %name,
                        plugin = err.plugin(),
                        error = %err,
                        body = %body,
                        "failed to init consumer, skipped"
                    );
                } else {
                    error!(
                        namespace = %namespace,
                        consumer = %name,
                        plugin = err.plugin(),
                        error = %err,
                        "failed to init consumer, skipped"
                    );
                }
            }
        }
    }

    consumers
}

fn build_consumer(
    namespace: &str,
    name: &str,
    raw: &Value,
    provider: &dyn PluginProvider,
) -> Result<Consumer, DomainError> {
    let entry = SnapshotEntry::from_value(raw)
        .map_err(|e| DomainError::malformed(format!("invalid snapshot entry: {e}")))?;
    let spec = ConsumerSpec::from_json(&entry.body)?;
    if spec.name != name {
        warn!(
            namespace = %namespace,
            consumer = %name,
            body_name = %spec.name,
            "consumer body name differs from snapshot key"
        );
    }
    Consumer::initialize(spec, namespace, entry.version, provider)
}
