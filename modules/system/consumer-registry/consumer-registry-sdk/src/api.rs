//! Public API traits for the consumer registry.
//!
//! The registry is constructed once and shared by reference between the
//! control-plane sync task (calls [`ConsumerRegistryClient::update`]) and the
//! request-handling path (calls [`ConsumerRegistryClient::lookup`]).

use std::fmt;
use std::sync::Arc;

use crate::models::Snapshot;
use crate::plugin_api::{ConsumerConfig, ParsedFilterConfig};

/// Read-only view of an initialized consumer.
///
/// Every view handed out by the registry is fully initialized: all auth and
/// filter configs of the consumer parsed and validated.
pub trait ConsumerView: fmt::Debug + Send + Sync {
    /// Consumer name, unique within its namespace.
    fn name(&self) -> &str;

    /// Namespace the consumer was synced into.
    fn namespace(&self) -> &str;

    /// Opaque version token from the control plane.
    fn resource_version(&self) -> &str;

    /// Validated auth config of the consumer for `plugin`.
    fn plugin_config(&self, plugin: &str) -> Option<&dyn ConsumerConfig>;

    /// Parsed filter configs, in control-plane order.
    fn filter_configs(&self) -> &[ParsedFilterConfig];
}

/// Public API trait for the consumer registry.
///
/// ```ignore
/// let registry: Arc<dyn ConsumerRegistryClient> = ...;
///
/// // sync task
/// registry.update(&snapshot);
///
/// // request path
/// let consumer = registry.lookup(namespace, "key-auth", &api_key);
/// ```
pub trait ConsumerRegistryClient: Send + Sync {
    /// Ingest a control-plane snapshot.
    ///
    /// Never fails: consumers that cannot be initialized are logged and left
    /// out of the new generation.
    fn update(&self, snapshot: &Snapshot);

    /// Resolve the consumer owning `key` for `plugin` in `namespace`.
    ///
    /// `None` is the expected answer for unknown credentials.
    fn lookup(&self, namespace: &str, plugin: &str, key: &str) -> Option<Arc<dyn ConsumerView>>;

    /// Fetch a consumer by name.
    fn consumer(&self, namespace: &str, name: &str) -> Option<Arc<dyn ConsumerView>>;
}
