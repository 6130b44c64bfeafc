//! Consumer entity.
//!
//! [`ConsumerSpec`] is the persisted body exactly as the control plane sends
//! it. [`Consumer`] is a spec whose plugin configs were all parsed and
//! validated; it can only be obtained through [`Consumer::initialize`], so a
//! partially initialized consumer never exists.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::error;

use consumer_registry_sdk::{ConsumerConfig, ConsumerView, ParsedFilterConfig, PluginProvider};

use super::error::DomainError;
use super::initializer;

/// Key of the plugin config inside a filter entry; never a metadata key.
const FILTER_CONFIG_KEY: &str = "config";

/// Raw filter entry of a consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPayload {
    /// Plugin-specific filter config, handed to the plugin parser as is.
    pub config: Value,

    /// Plugin-independent metadata, carried through untouched.
    #[serde(flatten)]
    metadata: IndexMap<String, Value>,
}

impl FilterPayload {
    #[must_use]
    pub fn new(config: Value) -> Self {
        Self {
            config,
            metadata: IndexMap::new(),
        }
    }

    /// Attach a metadata field next to `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedConsumer`] for the reserved `config` key.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Result<Self, DomainError> {
        let key = key.into();
        if key == FILTER_CONFIG_KEY {
            return Err(DomainError::malformed(format!(
                "filter metadata key '{FILTER_CONFIG_KEY}' is reserved"
            )));
        }
        self.metadata.insert(key, value);
        Ok(self)
    }

    #[must_use]
    pub fn metadata(&self) -> &IndexMap<String, Value> {
        &self.metadata
    }
}

/// Reads an explicit `null` like a missing field.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Persisted consumer body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerSpec {
    pub name: String,

    /// Plugin name -> raw serialized auth config.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub auth: IndexMap<String, String>,

    /// Plugin name -> raw filter entry, in filter chain order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub filters: IndexMap<String, FilterPayload>,
}

impl ConsumerSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auth: IndexMap::new(),
            filters: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_auth(mut self, plugin: impl Into<String>, raw: impl Into<String>) -> Self {
        self.auth.insert(plugin.into(), raw.into());
        self
    }

    #[must_use]
    pub fn with_filter(mut self, plugin: impl Into<String>, config: Value) -> Self {
        self.filters.insert(plugin.into(), FilterPayload::new(config));
        self
    }

    #[must_use]
    pub fn with_filter_payload(mut self, plugin: impl Into<String>, payload: FilterPayload) -> Self {
        self.filters.insert(plugin.into(), payload);
        self
    }

    /// Serialize to the wire body.
    ///
    /// Keys are strings and `config` can't be a metadata key, so the body
    /// always serializes; a failure is logged and yields an empty body.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!(consumer = %self.name, error = %e, "failed to serialize consumer");
            String::new()
        })
    }

    /// Parse a wire body.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedConsumer`] if the body does not match the
    /// consumer schema.
    pub fn from_json(s: &str) -> Result<Self, DomainError> {
        serde_json::from_str(s).map_err(|e| DomainError::malformed(e.to_string()))
    }
}

/// A fully initialized consumer.
#[derive(Debug)]
pub struct Consumer {
    spec: ConsumerSpec,
    namespace: String,
    resource_version: String,
    auth_configs: IndexMap<String, Box<dyn ConsumerConfig>>,
    filter_configs: Vec<ParsedFilterConfig>,
}

impl Consumer {
    /// Parse and validate every plugin config of `spec`.
    ///
    /// # Errors
    ///
    /// Returns the first [`DomainError`] raised by any auth or filter entry;
    /// nothing of the consumer is kept in that case.
    pub fn initialize(
        spec: ConsumerSpec,
        namespace: impl Into<String>,
        resource_version: impl Into<String>,
        provider: &dyn PluginProvider,
    ) -> Result<Self, DomainError> {
        let namespace = namespace.into();
        let configs = initializer::init_configs(&spec, &namespace, provider)?;

        Ok(Self {
            spec,
            namespace,
            resource_version: resource_version.into(),
            auth_configs: configs.auth,
            filter_configs: configs.filters,
        })
    }

    #[must_use]
    pub fn spec(&self) -> &ConsumerSpec {
        &self.spec
    }

    /// Serialize the persisted fields.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.spec.to_json()
    }

    /// Validated auth configs, in payload order.
    pub fn auth_configs(&self) -> impl Iterator<Item = (&str, &dyn ConsumerConfig)> {
        self.auth_configs
            .iter()
            .map(|(plugin, cfg)| (plugin.as_str(), cfg.as_ref()))
    }
}

impl ConsumerView for Consumer {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn resource_version(&self) -> &str {
        &self.resource_version
    }

    fn plugin_config(&self, plugin: &str) -> Option<&dyn ConsumerConfig> {
        self.auth_configs.get(plugin).map(AsRef::as_ref)
    }

    fn filter_configs(&self) -> &[ParsedFilterConfig] {
        &self.filter_configs
    }
}
