//! Domain errors for the consumer registry.

use std::fmt;

use consumer_registry_sdk::PluginConfigError;

/// Reasons a consumer cannot be initialized, plus provider setup failures.
///
/// Consumer errors never leave the registry: they are logged with the
/// namespace and consumer name and the consumer is left out of the index.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed consumer: {reason}")]
    MalformedConsumer { reason: String },

    #[error("auth plugin '{plugin}' not found")]
    UnknownAuthPlugin { plugin: String },

    #[error("plugin '{plugin}' is not for consumer")]
    NotAuthCapable { plugin: String },

    #[error("failed to unmarshal consumer config for plugin '{plugin}': {source}")]
    AuthConfigParse {
        plugin: String,
        source: PluginConfigError,
    },

    #[error("failed to validate consumer config for plugin '{plugin}': {source}")]
    AuthConfigValidation {
        plugin: String,
        source: PluginConfigError,
    },

    #[error("filter plugin '{plugin}' not found")]
    UnknownFilterPlugin { plugin: String },

    #[error("failed to parse filter config for plugin '{plugin}': {source}")]
    FilterConfigParse {
        plugin: String,
        source: PluginConfigError,
    },

    #[error("plugin '{plugin}' already has a registered {capability} capability")]
    PluginAlreadyRegistered {
        plugin: String,
        capability: &'static str,
    },
}

impl DomainError {
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedConsumer {
            reason: reason.into(),
        }
    }

    /// Plugin the error is attributed to, if any.
    #[must_use]
    pub fn plugin(&self) -> Option<&str> {
        match self {
            Self::MalformedConsumer { .. } => None,
            Self::UnknownAuthPlugin { plugin }
            | Self::NotAuthCapable { plugin }
            | Self::AuthConfigParse { plugin, .. }
            | Self::AuthConfigValidation { plugin, .. }
            | Self::UnknownFilterPlugin { plugin }
            | Self::FilterConfigParse { plugin, .. }
            | Self::PluginAlreadyRegistered { plugin, .. } => Some(plugin.as_str()),
        }
    }
}

/// Two consumers of one namespace produced the same lookup key for a plugin.
///
/// Non-fatal: the consumer indexed first keeps the key, the other one is not
/// reachable through that key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCollision {
    pub namespace: String,
    pub plugin: String,
    pub key: String,
    /// Consumer that keeps the key.
    pub existing: String,
    /// Consumer whose entry was dropped.
    pub rejected: String,
}

impl fmt::Display for IndexCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate index '{}' for plugin '{}' in namespace '{}': consumer '{}' ignored, '{}' kept",
            self.key, self.plugin, self.namespace, self.rejected, self.existing
        )
    }
}
