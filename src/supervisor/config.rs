//! Resource ceilings applied to every supervised verifier

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 10 GiB, the default address-space and file-size ceiling
pub const DEFAULT_BYTE_CEILING: u64 = 10 * 1024 * 1024 * 1024;

/// Default wall-clock budget for one verifier run (10 minutes)
pub const DEFAULT_WALL_CLOCK_TIMEOUT: Duration = Duration::from_secs(600);

/// Limits a supervised process runs under.
///
/// Byte ceilings are enforced by a [`super::ResourceLimiter`]; the wall-clock
/// timeout is enforced by the supervisor's own wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCeilings {
    pub address_space_limit: u64,
    pub file_size_limit: u64,
    #[serde(with = "duration_secs")]
    pub wall_clock_timeout: Duration,
}

impl Default for ResourceCeilings {
    fn default() -> Self {
        Self {
            address_space_limit: DEFAULT_BYTE_CEILING,
            file_size_limit: DEFAULT_BYTE_CEILING,
            wall_clock_timeout: DEFAULT_WALL_CLOCK_TIMEOUT,
        }
    }
}

impl ResourceCeilings {
    /// Default byte ceilings with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            wall_clock_timeout: timeout,
            ..Self::default()
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
