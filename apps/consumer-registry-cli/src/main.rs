#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `consumer-registry` operator tool.
//!
//! Applies control-plane snapshot files to an in-process consumer registry,
//! in order, then answers `namespace/plugin/key` lookups as JSON lines.

mod cli;
mod config;
mod logging;
mod run;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let cfg = config::AppConfig::load(cli.config.as_deref())?;
    logging::init(&cfg.logging)?;

    let stdout = std::io::stdout();
    run::run(&cli, &cfg, &mut stdout.lock())
}
