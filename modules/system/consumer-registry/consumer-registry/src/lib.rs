//! Consumer Registry Module
//!
//! Mirrors the consumers pushed by the control plane and keeps a derived,
//! per-plugin index used on every request to resolve the calling consumer.
//!
//! Provides the `ConsumerRegistryClient` trait implementation
//! ([`domain::ConsumerRegistryLocalClient`]) for the sync task and the request path.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::ConsumerRegistryConfig;
pub use domain::{
    Consumer, ConsumerRegistryLocalClient, ConsumerSpec, DomainError, Generation, PluginRegistry,
    RegistryStats, Service, UpdateSummary,
};
