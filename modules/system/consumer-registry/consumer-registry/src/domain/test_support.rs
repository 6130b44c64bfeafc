//! Stub plugins for registry tests.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;
use serde_json::Value;

use consumer_registry_sdk::{
    AuthPlugin, ConsumerConfig, FilterPlugin, ParseContext, ParsedConfig, PluginConfigError,
};

use super::error::DomainError;
use super::plugin_registry::PluginRegistry;

/// Auth config `{"key": "..."}` indexed by the key.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyConfig {
    pub key: String,
}

impl ConsumerConfig for KeyConfig {
    fn merge_json(&mut self, raw: &str) -> Result<(), PluginConfigError> {
        *self = serde_json::from_str(raw)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), PluginConfigError> {
        if self.key.is_empty() {
            return Err(PluginConfigError::new("key must not be empty"));
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

/// Auth plugin producing [`KeyConfig`], counting how many configs it created.
#[derive(Debug, Default)]
pub struct CountingKeyAuth {
    created: AtomicUsize,
}

impl CountingKeyAuth {
    /// Number of consumer configs parsed so far.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl AuthPlugin for CountingKeyAuth {
    fn new_config(&self) -> Box<dyn ConsumerConfig> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::<KeyConfig>::default()
    }
}

/// Filter plugin accepting any JSON object and returning it unchanged.
#[derive(Debug, Default)]
pub struct EchoFilter;

impl FilterPlugin for EchoFilter {
    fn parse(
        &self,
        raw: &Value,
        _ctx: &ParseContext<'_>,
    ) -> Result<ParsedConfig, PluginConfigError> {
        if !raw.is_object() {
            return Err(PluginConfigError::new("filter config must be an object"));
        }
        Ok(Arc::new(raw.clone()))
    }
}

/// Provider with:
/// - `key-auth` and `other-auth`: auth only;
/// - `echo`: filter only;
/// - `dual`: auth and filter.
///
/// Returns the counting `key-auth` plugin alongside the provider.
///
/// # Panics
///
/// Never in practice: the plugin names above are distinct.
#[must_use]
pub fn test_provider() -> (Arc<PluginRegistry>, Arc<CountingKeyAuth>) {
    let key_auth = Arc::new(CountingKeyAuth::default());
    let registry = build_registry(key_auth.clone())
        .unwrap_or_else(|e| panic!("test provider setup failed: {e}"));
    (Arc::new(registry), key_auth)
}

fn build_registry(key_auth: Arc<CountingKeyAuth>) -> Result<PluginRegistry, DomainError> {
    let mut registry = PluginRegistry::new();
    registry.register_auth("key-auth", key_auth)?;
    registry.register_auth("other-auth", Arc::new(CountingKeyAuth::default()))?;
    registry.register_filter("echo", Arc::new(EchoFilter))?;
    registry.register_auth("dual", Arc::new(CountingKeyAuth::default()))?;
    registry.register_filter("dual", Arc::new(EchoFilter))?;
    Ok(registry)
}

/// Serialized consumer body authenticating through `(plugin, key)` pairs.
#[must_use]
pub fn consumer_body(name: &str, keys: &[(&str, &str)]) -> String {
    let auth: serde_json::Map<String, Value> = keys
        .iter()
        .map(|(plugin, key)| {
            (
                (*plugin).to_owned(),
                Value::String(serde_json::json!({ "key": key }).to_string()),
            )
        })
        .collect();
    serde_json::json!({ "name": name, "auth": auth }).to_string()
}
