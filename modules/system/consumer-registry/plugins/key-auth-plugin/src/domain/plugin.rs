//! Key auth capability and request-time resolution.

use std::any::Any;
use std::sync::Arc;

use tracing::debug;

use consumer_registry_sdk::{
    AuthPlugin, ConsumerConfig, ConsumerRegistryClient, ConsumerView, PluginConfigError,
};

use crate::config::KeyAuthConsumerConfig;

/// Name the plugin is registered under.
pub const PLUGIN_NAME: &str = "key-auth";

impl ConsumerConfig for KeyAuthConsumerConfig {
    fn merge_json(&mut self, raw: &str) -> Result<(), PluginConfigError> {
        *self = serde_json::from_str(raw)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), PluginConfigError> {
        if self.key.is_empty() {
            return Err(PluginConfigError::new("key must not be empty"));
        }
        if self.key.trim() != self.key {
            return Err(PluginConfigError::new(
                "key must not have leading or trailing whitespace",
            ));
        }
        Ok(())
    }

    fn index(&self) -> String {
        self.key.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Key auth plugin.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyAuthPlugin;

impl KeyAuthPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolve the consumer presenting `key` in `namespace`.
    ///
    /// Returns `None` for empty or unknown keys.
    #[must_use]
    pub fn authenticate(
        registry: &dyn ConsumerRegistryClient,
        namespace: &str,
        key: &str,
    ) -> Option<Arc<dyn ConsumerView>> {
        if key.is_empty() {
            return None;
        }

        let consumer = registry.lookup(namespace, PLUGIN_NAME, key);
        match &consumer {
            Some(c) => debug!(namespace, consumer = c.name(), "key auth matched consumer"),
            None => debug!(namespace, "key auth found no consumer"),
        }
        consumer
    }

    /// Typed credential of a resolved consumer.
    #[must_use]
    pub fn consumer_config(consumer: &dyn ConsumerView) -> Option<&KeyAuthConsumerConfig> {
        consumer
            .plugin_config(PLUGIN_NAME)?
            .as_any()
            .downcast_ref::<KeyAuthConsumerConfig>()
    }
}

impl AuthPlugin for KeyAuthPlugin {
    fn new_config(&self) -> Box<dyn ConsumerConfig> {
        Box::<KeyAuthConsumerConfig>::default()
    }
}
