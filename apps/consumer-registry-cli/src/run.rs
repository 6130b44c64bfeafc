//! Snapshot application and lookup output.

use std::fs;
use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use consumer_registry::{ConsumerRegistryLocalClient, PluginRegistry, RegistryStats, Service};
use consumer_registry_sdk::{ConsumerRegistryClient, Snapshot};
use key_auth_plugin::KeyAuthPlugin;
use limit_req_plugin::LimitReqPlugin;

use crate::cli::{Cli, LookupQuery};
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct LookupLine<'a> {
    namespace: &'a str,
    plugin: &'a str,
    key: &'a str,
    found: bool,
    consumer: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatsLine {
    stats: RegistryStats,
}

/// Plugins shipped with the workspace.
fn builtin_plugins() -> anyhow::Result<PluginRegistry> {
    let mut plugins = PluginRegistry::new();
    plugins.register_auth(key_auth_plugin::PLUGIN_NAME, Arc::new(KeyAuthPlugin::new()))?;
    plugins.register_filter(limit_req_plugin::PLUGIN_NAME, Arc::new(LimitReqPlugin::new()))?;
    Ok(plugins)
}

fn load_snapshot(path: &std::path::Path) -> anyhow::Result<Snapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    Snapshot::from_json_str(&raw).with_context(|| format!("invalid snapshot {}", path.display()))
}

/// Apply every snapshot of `cli`, then write one JSON line per lookup and a
/// final stats line to `out`.
///
/// # Errors
///
/// Returns an error if a snapshot file cannot be read or parsed, or writing
/// to `out` fails. Individual consumer failures are only logged.
pub fn run(cli: &Cli, cfg: &AppConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let svc = Arc::new(Service::new(Arc::new(builtin_plugins()?), cfg.registry.clone()));
    let registry = ConsumerRegistryLocalClient::new(Arc::clone(&svc));

    for path in &cli.snapshots {
        let snapshot = load_snapshot(path)?;
        info!(path = %path.display(), namespaces = snapshot.len(), "applying snapshot");
        registry.update(&snapshot);
    }

    for query in &cli.lookups {
        write_lookup(&registry, query, out)?;
    }

    let stats = StatsLine { stats: svc.stats() };
    writeln!(out, "{}", serde_json::to_string(&stats)?)?;
    Ok(())
}

fn write_lookup(
    registry: &dyn ConsumerRegistryClient,
    query: &LookupQuery,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let consumer = registry.lookup(&query.namespace, &query.plugin, &query.key);
    let line = LookupLine {
        namespace: &query.namespace,
        plugin: &query.plugin,
        key: &query.key,
        found: consumer.is_some(),
        consumer: consumer.map(|c| c.name().to_owned()),
    };
    writeln!(out, "{}", serde_json::to_string(&line)?)?;
    Ok(())
}
