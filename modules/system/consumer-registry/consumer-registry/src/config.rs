//! Configuration for the consumer registry.

use serde::{Deserialize, Serialize};

/// Configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsumerRegistryConfig {
    /// Drop namespaces that are absent from an incoming snapshot.
    ///
    /// Off by default: the control plane is expected to push every namespace
    /// on each sync, and absent namespaces are left untouched. Enable only
    /// when the control plane guarantees full-set pushes.
    pub prune_missing_namespaces: bool,

    /// Include the raw consumer body in failure logs.
    ///
    /// Bodies carry credentials, keep this off outside of debugging.
    pub log_consumer_payloads: bool,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_missing_namespaces_and_redact_payloads() {
        let cfg = ConsumerRegistryConfig::default();
        assert!(!cfg.prune_missing_namespaces);
        assert!(!cfg.log_consumer_payloads);
    }

    #[test]
    fn partial_document_uses_defaults() {
        let cfg: ConsumerRegistryConfig =
            serde_json::from_value(serde_json::json!({"prune_missing_namespaces": true})).unwrap();
        assert!(cfg.prune_missing_namespaces);
        assert!(!cfg.log_consumer_payloads);
    }

    #[test]
    fn rejects_unknown_fields() {
        let res: Result<ConsumerRegistryConfig, _> =
            serde_json::from_value(serde_json::json!({"prune": true}));
        assert!(res.is_err());
    }
}
