//! Joined per-experiment view across verification modes

use serde::{Deserialize, Serialize};

use super::consistency::{ConsistencyLevel, Verdict};
use super::key::ExperimentKey;

/// Computed join of one key's runs. Never persisted.
///
/// Two notions of "timed out" are kept apart: `*_timed_out` means no usable
/// self-reported result exists in that mode's log, while `*_killed` is the
/// supervisor's record that it had to kill the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub key: ExperimentKey,
    pub violation_level: ConsistencyLevel,
    pub total_transactions: u64,
    /// Meaningless when sat data is unavailable for this run
    pub sat_duration: f64,
    pub sat_timed_out: bool,
    pub sat_killed: Option<bool>,
    pub algo_duration: f64,
    pub algo_timed_out: bool,
    pub algo_killed: bool,
    pub raw_exec_duration: f64,
}

impl AggregatedRecord {
    pub fn algo_verdict(&self, target: ConsistencyLevel) -> Verdict {
        verdict(self.algo_timed_out, self.violation_level, target)
    }

    pub fn sat_verdict(&self, target: ConsistencyLevel) -> Verdict {
        verdict(self.sat_timed_out, self.violation_level, target)
    }
}

fn verdict(timed_out: bool, level: ConsistencyLevel, target: ConsistencyLevel) -> Verdict {
    if timed_out {
        Verdict::TimedOut
    } else {
        level.classify(target)
    }
}
