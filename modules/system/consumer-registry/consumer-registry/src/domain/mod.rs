//! Domain layer for the consumer registry.

pub mod consumer;
pub mod error;
pub mod initializer;
pub mod local_client;
pub mod plugin_registry;
pub mod resource_index;
pub mod scope_index;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use consumer::{Consumer, ConsumerSpec, FilterPayload};
pub use error::{DomainError, IndexCollision};
pub use local_client::ConsumerRegistryLocalClient;
pub use plugin_registry::PluginRegistry;
pub use resource_index::{NamespaceConsumers, ResourceIndex, SyncStats};
pub use scope_index::ScopeIndex;
pub use service::{Generation, RegistryStats, Service, UpdateSummary};
