//! Error taxonomy for the benchmark harness
//!
//! Only failures that must reach a caller live here. Timeouts are an outcome
//! state on `RunOutcome`, and unreadable result logs are absorbed by the
//! extractor into `Extraction::Missing` / `Extraction::Corrupt`.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{ExperimentKey, VerificationMode};

#[derive(Debug, Error)]
pub enum BenchError {
    /// A configuration directory name is not `<clients>_<txns>_<events>_<vars>`
    #[error("malformed configuration id: {name:?}")]
    MalformedConfigId { name: String },

    /// A run directory name is neither `hist-NNNNN` nor a bare integer
    #[error("malformed run id: {name:?}")]
    MalformedRunId { name: String },

    /// The verifier process could not be started
    #[error("failed to launch {program}: {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// No store row exists for a mode the join requires
    #[error("no {mode} run recorded for {key} in {}", store.display())]
    MissingRun {
        mode: VerificationMode,
        key: ExperimentKey,
        store: PathBuf,
    },

    /// The violation-detection log never reported a transaction count
    #[error("violation log {} has no `number of transactions` entry", path.display())]
    MissingTransactionCount { path: PathBuf },

    /// The violation-detection log is absent, unreadable or reports no level
    #[error("violation log {}: {reason}", path.display())]
    ViolationLog { path: PathBuf, reason: String },

    /// The external duration utility failed or printed something unparseable
    #[error("duration probe failed for {}: {reason}", artifact.display())]
    DurationProbe { artifact: PathBuf, reason: String },

    #[error("unknown consistency level: {0:?}")]
    UnknownConsistencyLevel(String),

    #[error("result store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BenchError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BenchError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type BenchResult<T> = std::result::Result<T, BenchError>;
