//! Error types shared between the consumer registry and its plugins.

use thiserror::Error;

/// Error reported by a plugin while deserializing, validating or parsing
/// a consumer-scoped configuration.
///
/// The registry wraps it with the plugin name and consumer context before
/// logging, so plugins only describe what is wrong with the payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PluginConfigError {
    message: String,
}

impl PluginConfigError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for PluginConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}
