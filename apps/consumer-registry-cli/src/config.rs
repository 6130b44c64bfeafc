//! Application configuration.
//!
//! Defaults, then the YAML file passed with `--config`, then environment
//! variables prefixed with `CONSUMER_REGISTRY__`, where `__` separates
//! nesting levels:
//!
//! ```text
//! CONSUMER_REGISTRY__LOGGING__LEVEL=debug
//! CONSUMER_REGISTRY__REGISTRY__PRUNE_MISSING_NAMESPACES=true
//! ```

use std::path::Path;

use anyhow::{Context, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use consumer_registry::ConsumerRegistryConfig;

pub const ENV_PREFIX: &str = "CONSUMER_REGISTRY__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub registry: ConsumerRegistryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub level: String,

    /// Emit JSON lines instead of human readable logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load and merge every configuration source.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist or any source has invalid or
    /// unknown keys.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file {} not found", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;

    use figment::Jail;

    use super::*;

    fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|_| {
            let cfg = AppConfig::load(None).unwrap();
            assert_eq!(cfg, AppConfig::default());
            assert_eq!(cfg.logging.level, "info");
            Ok(())
        });
    }

    #[test]
    fn reads_yaml_file() {
        let file = yaml_file(
            "logging:\n  level: debug\n  json: true\nregistry:\n  prune_missing_namespaces: true\n",
        );
        Jail::expect_with(|_| {
            let cfg = AppConfig::load(Some(file.path())).unwrap();
            assert_eq!(cfg.logging.level, "debug");
            assert!(cfg.logging.json);
            assert!(cfg.registry.prune_missing_namespaces);
            assert!(!cfg.registry.log_consumer_payloads);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        let file = yaml_file("registry:\n  log_consumer_payloads: false\n");
        Jail::expect_with(|jail| {
            jail.set_env("CONSUMER_REGISTRY__REGISTRY__LOG_CONSUMER_PAYLOADS", "true");
            jail.set_env("CONSUMER_REGISTRY__LOGGING__LEVEL", "warn");
            let cfg = AppConfig::load(Some(file.path())).unwrap();
            assert!(cfg.registry.log_consumer_payloads);
            assert_eq!(cfg.logging.level, "warn");
            Ok(())
        });
    }

    #[test]
    fn rejects_unknown_keys() {
        let file = yaml_file("registry:\n  prune: true\n");
        Jail::expect_with(|_| {
            assert!(AppConfig::load(Some(file.path())).is_err());
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(err.to_string().contains("not found"), "got: {err}");
    }
}
