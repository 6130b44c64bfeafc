//! Plugin implementation.

mod plugin;

pub use plugin::{KeyAuthPlugin, PLUGIN_NAME};
