//! Consumer-scoped configuration of the key auth plugin.

use serde::{Deserialize, Serialize};

/// Credential of one consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyAuthConsumerConfig {
    /// Pre-shared key presented by the consumer.
    pub key: String,
}
