//! Filter configuration of the limit req plugin.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_period() -> Duration {
    Duration::from_secs(1)
}

/// Rate limit of one consumer: `average` requests per `period`, with up to
/// `burst` extra requests absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitReqConfig {
    pub average: u32,

    #[serde(default)]
    pub burst: u32,

    /// Human readable duration, e.g. `"1s"` or `"1m 30s"`.
    #[serde(default = "default_period", with = "duration_str")]
    pub period: Duration,
}

mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
