#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Limit Req Plugin
//!
//! Filter-capable consumer registry plugin: a consumer can carry its own
//! request rate limit, applied by the filter chain once the consumer is
//! resolved.
//!
//! ## Consumer configuration
//!
//! ```json
//! { "filters": { "limit-req": { "config": { "average": 10, "burst": 5, "period": "1s" } } } }
//! ```

pub mod config;
pub mod domain;

pub use config::LimitReqConfig;
pub use domain::{LimitReq, LimitReqPlugin, PLUGIN_NAME};
