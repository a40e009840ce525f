//! Experiment identity: configuration ids, run ids and the full key.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{BenchError, BenchResult};

/// Prefix of run directory names (`hist-00042`)
pub const RUN_ID_PREFIX: &str = "hist-";

fn config_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)_(\d+)_(\d+)_(\d+)$").unwrap_or_else(|e| {
            unreachable!("configuration id pattern is a valid literal: {e}")
        })
    })
}

/// Generator parameters of one execution-history configuration.
///
/// Directory form is `<clients>_<transactions>_<events>_<variables>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConfigId {
    pub clients: u32,
    pub transactions: u32,
    pub events: u32,
    pub variables: u32,
}

impl ConfigId {
    pub fn new(clients: u32, transactions: u32, events: u32, variables: u32) -> Self {
        Self {
            clients,
            transactions,
            events,
            variables,
        }
    }

    /// Parse a configuration directory name.
    pub fn parse(name: &str) -> BenchResult<Self> {
        let malformed = || BenchError::MalformedConfigId {
            name: name.to_string(),
        };
        let caps = config_id_pattern().captures(name).ok_or_else(malformed)?;

        let mut fields = [0u32; 4];
        for (slot, field) in fields.iter_mut().enumerate() {
            *field = caps[slot + 1].parse().map_err(|_| malformed())?;
        }

        let [clients, transactions, events, variables] = fields;
        Ok(Self::new(clients, transactions, events, variables))
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.clients, self.transactions, self.events, self.variables
        )
    }
}

impl FromStr for ConfigId {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Index of one generated history within a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub u32);

impl RunId {
    /// Parse a run entry name: `hist-00012`, `12`, or either with an extension.
    pub fn parse(name: &str) -> BenchResult<Self> {
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name);
        let digits = stem.strip_prefix(RUN_ID_PREFIX).unwrap_or(stem);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BenchError::MalformedRunId {
                name: name.to_string(),
            });
        }

        digits
            .parse()
            .map(RunId)
            .map_err(|_| BenchError::MalformedRunId {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{RUN_ID_PREFIX}{:05}", self.0)
    }
}

/// Immutable identity of one execution-history instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExperimentKey {
    pub config: ConfigId,
    pub run_id: RunId,
    pub partitioned: bool,
}

impl ExperimentKey {
    pub fn new(config: ConfigId, run_id: RunId, partitioned: bool) -> Self {
        Self {
            config,
            run_id,
            partitioned,
        }
    }

    /// Relative directory of this key inside any result tree
    pub fn relative_dir(&self) -> std::path::PathBuf {
        Path::new(&self.config.to_string()).join(self.run_id.to_string())
    }
}

impl fmt::Display for ExperimentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.partitioned { "partition" } else { "all" };
        write!(f, "{}/{} ({mode})", self.config, self.run_id)
    }
}
