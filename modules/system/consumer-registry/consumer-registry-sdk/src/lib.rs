//! Consumer Registry SDK
//!
//! This crate provides the public API for the `consumer_registry` module:
//!
//! - [`ConsumerRegistryClient`] - Public API trait for the sync task and the request path
//! - [`ConsumerView`] - Read-only view of a resolved consumer
//! - [`PluginProvider`], [`AuthPlugin`], [`ConsumerConfig`], [`FilterPlugin`] - Plugin contracts
//! - [`Snapshot`] - Control-plane snapshot document
//! - [`PluginConfigError`] - Error type returned by plugins
//!
//! ## Usage
//!
//! ```ignore
//! use consumer_registry_sdk::ConsumerRegistryClient;
//!
//! // Control-plane sync task
//! registry.update(&snapshot);
//!
//! // Request path
//! if let Some(consumer) = registry.lookup("default", "key-auth", presented_key) {
//!     tracing::debug!(consumer = consumer.name(), "request authenticated");
//! }
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;
pub mod plugin_api;

// Re-export main types at crate root
pub use api::{ConsumerRegistryClient, ConsumerView};
pub use error::PluginConfigError;
pub use models::{NamespaceEntries, Snapshot, SnapshotEntry};
pub use plugin_api::{
    AuthPlugin, ConsumerConfig, FilterPlugin, ParseContext, ParsedConfig, ParsedFilterConfig,
    PluginProvider,
};
