//! Verification modes and per-invocation run records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::key::ExperimentKey;

/// Verification strategy that produced a result tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationMode {
    /// Bespoke polynomial-time checking
    Algorithmic,
    /// Satisfiability-encoding based checking
    Sat,
    /// Incremental search for the minimal violated level
    ViolationDetection,
}

impl VerificationMode {
    /// Suffix appended to the tree name of this mode
    pub fn tree_suffix(&self) -> &'static str {
        match self {
            VerificationMode::Algorithmic => "",
            VerificationMode::Sat => "_sat",
            VerificationMode::ViolationDetection => "_inc",
        }
    }
}

impl fmt::Display for VerificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationMode::Algorithmic => write!(f, "algorithmic"),
            VerificationMode::Sat => write!(f, "sat"),
            VerificationMode::ViolationDetection => write!(f, "violation-detection"),
        }
    }
}

/// One supervised verifier invocation, ready to be appended to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRun {
    pub key: ExperimentKey,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Wall-clock seconds measured around the subprocess
    pub binary_duration: f64,
    /// Seconds the verifier reported for itself, -1 when unavailable
    pub algo_duration: f64,
    /// The supervisor killed the process after the wall-clock budget
    pub timed_out: bool,
    pub return_code: Option<i32>,
    pub result: Option<String>,
    pub sat: bool,
    pub comment: Option<String>,
    pub tag: String,
}

impl VerificationRun {
    /// The result label is only meaningful for a completed, parsed run.
    pub fn has_result(&self) -> bool {
        !self.timed_out && self.result.is_some()
    }
}
