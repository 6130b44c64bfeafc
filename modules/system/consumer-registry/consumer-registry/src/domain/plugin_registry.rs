//! Name -> plugin capability map.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use consumer_registry_sdk::{AuthPlugin, FilterPlugin, PluginProvider};
use tracing::debug;

use super::error::DomainError;

#[derive(Default)]
struct PluginEntry {
    auth: Option<Arc<dyn AuthPlugin>>,
    filter: Option<Arc<dyn FilterPlugin>>,
}

/// In-process [`PluginProvider`] populated at startup.
///
/// A plugin name may carry both capabilities; each capability can only be
/// registered once per name.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, PluginEntry>,
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the auth capability of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::PluginAlreadyRegistered`] if `name` already has
    /// an auth capability.
    pub fn register_auth(
        &mut self,
        name: impl Into<String>,
        plugin: Arc<dyn AuthPlugin>,
    ) -> Result<(), DomainError> {
        let name = name.into();
        let entry = self.plugins.entry(name.clone()).or_default();
        if entry.auth.is_some() {
            return Err(DomainError::PluginAlreadyRegistered {
                plugin: name,
                capability: "auth",
            });
        }
        debug!(plugin = %name, "registered auth plugin");
        entry.auth = Some(plugin);
        Ok(())
    }

    /// Register the filter capability of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::PluginAlreadyRegistered`] if `name` already has
    /// a filter capability.
    pub fn register_filter(
        &mut self,
        name: impl Into<String>,
        plugin: Arc<dyn FilterPlugin>,
    ) -> Result<(), DomainError> {
        let name = name.into();
        let entry = self.plugins.entry(name.clone()).or_default();
        if entry.filter.is_some() {
            return Err(DomainError::PluginAlreadyRegistered {
                plugin: name,
                capability: "filter",
            });
        }
        debug!(plugin = %name, "registered filter plugin");
        entry.filter = Some(plugin);
        Ok(())
    }

    /// Registered plugin names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PluginProvider for PluginRegistry {
    fn is_registered(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    fn auth_plugin(&self, name: &str) -> Option<Arc<dyn AuthPlugin>> {
        self.plugins.get(name).and_then(|p| p.auth.clone())
    }

    fn filter_plugin(&self, name: &str) -> Option<Arc<dyn FilterPlugin>> {
        self.plugins.get(name).and_then(|p| p.filter.clone())
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}
