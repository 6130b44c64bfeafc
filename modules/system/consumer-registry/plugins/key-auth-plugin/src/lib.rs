#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Key Auth Plugin
//!
//! Auth-capable consumer registry plugin: every consumer carries a
//! pre-shared key, and requests presenting that key resolve to the consumer.
//!
//! ## Consumer configuration
//!
//! ```json
//! { "auth": { "key-auth": "{\"key\":\"rumia\"}" } }
//! ```
//!
//! The key is also the consumer's lookup key, so keys must be unique within a
//! namespace.

pub mod config;
pub mod domain;

pub use config::KeyAuthConsumerConfig;
pub use domain::{KeyAuthPlugin, PLUGIN_NAME};
