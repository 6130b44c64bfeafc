//! Plugin contracts consumed by the consumer registry.
//!
//! Plugins come in two capabilities, and a single plugin name may carry both:
//!
//! - **auth**: owns a consumer-scoped credential config and derives the lookup
//!   key used to match an incoming request to a consumer ([`AuthPlugin`]);
//! - **filter**: parses per-consumer filter configuration that the filter chain
//!   runs once the consumer is known ([`FilterPlugin`]).
//!
//! The registry never inspects plugin configs. It only deserializes,
//! validates and indexes them through these traits.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::PluginConfigError;

/// Typed, plugin-owned consumer configuration.
///
/// Produced empty by [`AuthPlugin::new_config`], then filled from the raw
/// payload with [`merge_json`](Self::merge_json) and checked with
/// [`validate`](Self::validate).
pub trait ConsumerConfig: fmt::Debug + Send + Sync + 'static {
    /// Deserialize the raw payload received from the control plane into `self`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginConfigError`] if the payload is not a valid document
    /// for this plugin.
    fn merge_json(&mut self, raw: &str) -> Result<(), PluginConfigError>;

    /// Check semantic constraints after deserialization.
    ///
    /// # Errors
    ///
    /// Returns [`PluginConfigError`] describing the first violated constraint.
    fn validate(&self) -> Result<(), PluginConfigError>;

    /// Lookup key of this consumer for the owning plugin.
    ///
    /// Keys are only unique per (namespace, plugin); two plugins may produce
    /// the same literal key without conflict.
    fn index(&self) -> String;

    /// Access to the concrete type, so the owning plugin can downcast at request time.
    fn as_any(&self) -> &dyn Any;
}

/// Authentication capability of a plugin.
pub trait AuthPlugin: Send + Sync {
    /// Return an empty config ready to receive a consumer payload.
    fn new_config(&self) -> Box<dyn ConsumerConfig>;
}

/// Opaque, ready-to-run filter config produced by [`FilterPlugin::parse`].
pub type ParsedConfig = Arc<dyn Any + Send + Sync>;

/// Consumer context handed to filter parsers.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub namespace: &'a str,
    pub consumer: &'a str,
}

/// Filter capability of a plugin.
///
/// The plugin doubles as the config factory the filter chain uses to build
/// filters from the parsed config.
pub trait FilterPlugin: Send + Sync {
    /// Parse the raw `config` value of a consumer filter entry.
    ///
    /// # Errors
    ///
    /// Returns [`PluginConfigError`] if the config is malformed or invalid.
    fn parse(
        &self,
        raw: &serde_json::Value,
        ctx: &ParseContext<'_>,
    ) -> Result<ParsedConfig, PluginConfigError>;
}

/// One parsed consumer filter, in the order the control plane listed it.
#[derive(Clone)]
pub struct ParsedFilterConfig {
    /// Plugin name.
    pub name: String,
    /// Output of [`FilterPlugin::parse`].
    pub parsed_config: ParsedConfig,
    /// Plugin that parsed the config; builds the filter downstream.
    pub config_factory: Arc<dyn FilterPlugin>,
}

impl ParsedFilterConfig {
    /// Downcast the parsed config to the plugin's concrete type.
    #[must_use]
    pub fn parsed_as<T: Any>(&self) -> Option<&T> {
        self.parsed_config.downcast_ref::<T>()
    }
}

impl fmt::Debug for ParsedFilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedFilterConfig")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Resolves plugin names to their capabilities.
///
/// `is_registered` lets the registry tell an unknown plugin apart from a
/// known plugin that lacks the requested capability.
pub trait PluginProvider: Send + Sync {
    /// Whether any capability is registered under `name`.
    fn is_registered(&self, name: &str) -> bool;

    /// Authentication capability registered under `name`, if any.
    fn auth_plugin(&self, name: &str) -> Option<Arc<dyn AuthPlugin>>;

    /// Filter capability registered under `name`, if any.
    fn filter_plugin(&self, name: &str) -> Option<Arc<dyn FilterPlugin>>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    struct EchoFilter;

    impl FilterPlugin for EchoFilter {
        fn parse(
            &self,
            raw: &serde_json::Value,
            _ctx: &ParseContext<'_>,
        ) -> Result<ParsedConfig, PluginConfigError> {
            Ok(Arc::new(raw.clone()))
        }
    }

    #[test]
    fn parsed_filter_config_downcasts_to_plugin_type() {
        let plugin: Arc<dyn FilterPlugin> = Arc::new(EchoFilter);
        let ctx = ParseContext {
            namespace: "ns",
            consumer: "alice",
        };
        let parsed = plugin.parse(&serde_json::json!({"a": 1}), &ctx).unwrap();
        let cfg = ParsedFilterConfig {
            name: "echo".to_owned(),
            parsed_config: parsed,
            config_factory: plugin,
        };

        assert_eq!(
            cfg.parsed_as::<serde_json::Value>(),
            Some(&serde_json::json!({"a": 1}))
        );
        assert!(cfg.parsed_as::<String>().is_none());
        assert!(format!("{cfg:?}").contains("echo"));
    }
}
