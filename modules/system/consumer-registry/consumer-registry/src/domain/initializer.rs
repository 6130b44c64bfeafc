//! Turns raw consumer payloads into plugin configs.
//!
//! This is the only place where plugin schemas are touched; everything else
//! in the registry treats configs as opaque handles.

use indexmap::IndexMap;
use tracing::info;

use consumer_registry_sdk::{ConsumerConfig, ParseContext, ParsedFilterConfig, PluginProvider};

use super::consumer::{ConsumerSpec, FilterPayload};
use super::error::DomainError;

/// Parsed configs of one consumer.
#[derive(Debug)]
pub struct InitializedConfigs {
    pub auth: IndexMap<String, Box<dyn ConsumerConfig>>,
    pub filters: Vec<ParsedFilterConfig>,
}

/// Initialize every auth and filter config of `spec`.
///
/// # Errors
///
/// Returns the first failing entry's error. Entries are processed in payload
/// order, auth entries first.
pub fn init_configs(
    spec: &ConsumerSpec,
    namespace: &str,
    provider: &dyn PluginProvider,
) -> Result<InitializedConfigs, DomainError> {
    info!(consumer = %spec.name, namespace = %namespace, "init configs for consumer");

    let mut auth = IndexMap::with_capacity(spec.auth.len());
    for (plugin, raw) in &spec.auth {
        let cfg = init_auth_config(plugin, raw, provider)?;
        auth.insert(plugin.clone(), cfg);
    }

    let ctx = ParseContext {
        namespace,
        consumer: &spec.name,
    };
    let mut filters = Vec::with_capacity(spec.filters.len());
    for (plugin, payload) in &spec.filters {
        filters.push(init_filter_config(plugin, payload, &ctx, provider)?);
    }

    Ok(InitializedConfigs { auth, filters })
}

fn init_auth_config(
    plugin: &str,
    raw: &str,
    provider: &dyn PluginProvider,
) -> Result<Box<dyn ConsumerConfig>, DomainError> {
    let Some(auth_plugin) = provider.auth_plugin(plugin) else {
        return Err(if provider.is_registered(plugin) {
            DomainError::NotAuthCapable {
                plugin: plugin.to_owned(),
            }
        } else {
            DomainError::UnknownAuthPlugin {
                plugin: plugin.to_owned(),
            }
        });
    };

    let mut cfg = auth_plugin.new_config();
    cfg.merge_json(raw)
        .map_err(|source| DomainError::AuthConfigParse {
            plugin: plugin.to_owned(),
            source,
        })?;
    cfg.validate()
        .map_err(|source| DomainError::AuthConfigValidation {
            plugin: plugin.to_owned(),
            source,
        })?;

    Ok(cfg)
}

fn init_filter_config(
    plugin: &str,
    payload: &FilterPayload,
    ctx: &ParseContext<'_>,
    provider: &dyn PluginProvider,
) -> Result<ParsedFilterConfig, DomainError> {
    let filter_plugin = provider
        .filter_plugin(plugin)
        .ok_or_else(|| DomainError::UnknownFilterPlugin {
            plugin: plugin.to_owned(),
        })?;

    let parsed_config = filter_plugin
        .parse(&payload.config, ctx)
        .map_err(|source| DomainError::FilterConfigParse {
            plugin: plugin.to_owned(),
            source,
        })?;

    Ok(ParsedFilterConfig {
        name: plugin.to_owned(),
        parsed_config,
        config_factory: filter_plugin,
    })
}
