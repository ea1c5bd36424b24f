use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cli::Args;

/// Default hop ceiling
pub const DEFAULT_MAX_HOPS: u8 = 30;
/// First port of the conventional traceroute range
pub const DEFAULT_PORT: u16 = 33434;
/// Receive timeout for every probe
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Hop ceiling
    pub max_hops: u8,
    /// UDP destination port
    pub port: u16,
    /// Receive timeout per probe
    #[serde(with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            port: DEFAULT_PORT,
            timeout: PROBE_TIMEOUT,
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            max_hops: args.max_hops,
            port: args.port,
            ..Self::default()
        }
    }
}

/// Serde helper for Duration
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}
