//! Ordered consistency levels and acceptable/violation classification

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::BenchError;

/// Consistency guarantees from weakest to strongest.
///
/// `Ok` means the verifier found no violation at all. The derived `Ord`
/// follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConsistencyLevel {
    ReadCommitted,
    ReadAtomic,
    Causal,
    Prefix,
    SnapshotIsolation,
    Serializable,
    Ok,
}

impl ConsistencyLevel {
    /// All levels in ascending order
    pub const ALL: [ConsistencyLevel; 7] = [
        ConsistencyLevel::ReadCommitted,
        ConsistencyLevel::ReadAtomic,
        ConsistencyLevel::Causal,
        ConsistencyLevel::Prefix,
        ConsistencyLevel::SnapshotIsolation,
        ConsistencyLevel::Serializable,
        ConsistencyLevel::Ok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::ReadCommitted => "ReadCommitted",
            ConsistencyLevel::ReadAtomic => "ReadAtomic",
            ConsistencyLevel::Causal => "Causal",
            ConsistencyLevel::Prefix => "Prefix",
            ConsistencyLevel::SnapshotIsolation => "SnapshotIsolation",
            ConsistencyLevel::Serializable => "Serializable",
            ConsistencyLevel::Ok => "ok",
        }
    }

    /// Short name understood by the verifier's `--cons` flag
    pub fn verifier_flag(&self) -> Option<&'static str> {
        match self {
            ConsistencyLevel::ReadCommitted => Some("rc"),
            ConsistencyLevel::ReadAtomic => Some("ra"),
            ConsistencyLevel::Causal => Some("cc"),
            ConsistencyLevel::Prefix => Some("pre"),
            ConsistencyLevel::SnapshotIsolation => Some("si"),
            ConsistencyLevel::Serializable => Some("ser"),
            ConsistencyLevel::Ok => None,
        }
    }

    /// Classify a detected level against the level a database promises.
    pub fn classify(self, target: ConsistencyLevel) -> Verdict {
        if self >= target {
            Verdict::Acceptable
        } else {
            Verdict::Violation
        }
    }

    /// Target level of the databases used in the published evaluation
    pub fn target_for_database(db_name: &str) -> Option<ConsistencyLevel> {
        match db_name {
            "antidote" => Some(ConsistencyLevel::Causal),
            "roachdb" | "galera" => Some(ConsistencyLevel::Serializable),
            "roachdb_general" => Some(ConsistencyLevel::Ok),
            _ => None,
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsistencyLevel {
    type Err = BenchError;

    /// Accepts full names, the legacy `RepeatableRead` alias and verifier short names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ReadCommitted" | "rc" => Ok(ConsistencyLevel::ReadCommitted),
            "ReadAtomic" | "RepeatableRead" | "ra" | "rr" => Ok(ConsistencyLevel::ReadAtomic),
            "Causal" | "cc" => Ok(ConsistencyLevel::Causal),
            "Prefix" | "pre" => Ok(ConsistencyLevel::Prefix),
            "SnapshotIsolation" | "si" => Ok(ConsistencyLevel::SnapshotIsolation),
            "Serializable" | "ser" => Ok(ConsistencyLevel::Serializable),
            "ok" | "Ok" => Ok(ConsistencyLevel::Ok),
            other => Err(BenchError::UnknownConsistencyLevel(other.to_string())),
        }
    }
}

impl Serialize for ConsistencyLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConsistencyLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Outcome of classifying one mode's result for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// Detected level meets or exceeds the target
    Acceptable,
    /// Detected level is below the target
    Violation,
    /// The mode produced no usable result
    TimedOut,
}
