//! Limit req filter capability.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use consumer_registry_sdk::{FilterPlugin, ParseContext, ParsedConfig, PluginConfigError};

use crate::config::LimitReqConfig;

/// Name the plugin is registered under.
pub const PLUGIN_NAME: &str = "limit-req";

/// Ready-to-run limit of one consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitReq {
    /// Bucket key, one bucket per consumer.
    pub bucket: String,
    /// Time between two admitted requests at the average rate.
    pub interval: Duration,
    pub burst: u32,
}

impl LimitReq {
    /// Requests admitted at once from a full bucket.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.burst.saturating_add(1)
    }
}

/// Limit req plugin.
#[derive(Debug, Default, Clone, Copy)]
pub struct LimitReqPlugin;

impl LimitReqPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn validate(cfg: &LimitReqConfig) -> Result<(), PluginConfigError> {
        if cfg.average == 0 {
            return Err(PluginConfigError::new("average must be greater than 0"));
        }
        if cfg.period.is_zero() {
            return Err(PluginConfigError::new("period must be greater than 0"));
        }
        Ok(())
    }
}

impl FilterPlugin for LimitReqPlugin {
    fn parse(&self, raw: &Value, ctx: &ParseContext<'_>) -> Result<ParsedConfig, PluginConfigError> {
        let cfg = LimitReqConfig::deserialize(raw)?;
        Self::validate(&cfg)?;

        let limit = LimitReq {
            bucket: format!("{}/{}", ctx.namespace, ctx.consumer),
            interval: cfg.period / cfg.average,
            burst: cfg.burst,
        };
        debug!(
            namespace = ctx.namespace,
            consumer = ctx.consumer,
            interval = ?limit.interval,
            burst = limit.burst,
            "parsed consumer rate limit"
        );
        Ok(Arc::new(limit))
    }
}
