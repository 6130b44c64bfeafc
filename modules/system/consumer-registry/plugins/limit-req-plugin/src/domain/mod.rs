//! Plugin implementation.

mod plugin;

pub use plugin::{LimitReq, LimitReqPlugin, PLUGIN_NAME};
