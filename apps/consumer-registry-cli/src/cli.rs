//! Command line arguments.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "consumer-registry", version)]
#[command(about = "Apply consumer snapshots and resolve consumers by credential")]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Snapshot JSON file, applied in the order given
    #[arg(short, long = "snapshot", value_name = "FILE")]
    pub snapshots: Vec<PathBuf>,

    /// Lookup to run after all snapshots are applied
    #[arg(short, long = "lookup", value_name = "NS/PLUGIN/KEY")]
    pub lookups: Vec<LookupQuery>,
}

/// `namespace/plugin/key`; the key may itself contain `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    pub namespace: String,
    pub plugin: String,
    pub key: String,
}

impl FromStr for LookupQuery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ns), Some(plugin), Some(key))
                if !ns.is_empty() && !plugin.is_empty() && !key.is_empty() =>
            {
                Ok(Self {
                    namespace: ns.to_owned(),
                    plugin: plugin.to_owned(),
                    key: key.to_owned(),
                })
            }
            _ => Err(format!("expected NS/PLUGIN/KEY, got '{s}'")),
        }
    }
}

impl fmt::Display for LookupQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.plugin, self.key)
    }
}
