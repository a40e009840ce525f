//! Reading the logs verifiers write for themselves
//!
//! Nothing in this module returns an error for bad log contents: a missing
//! log becomes [`Extraction::Missing`], an unusable one
//! [`Extraction::Corrupt`].

mod extract;
mod log;

pub use extract::{extract, from_replay, Extraction, ResultLine, NO_DURATION};
pub use log::{FinalLine, LogReplay, MIN_VIOLATION_FIELD, TRANSACTIONS_FIELD};

use std::path::{Path, PathBuf};

/// File name of the line-delimited result log inside a run directory
pub const RESULT_LOG_FILE: &str = "result_log.json";

pub fn result_log_path(run_dir: &Path) -> PathBuf {
    run_dir.join(RESULT_LOG_FILE)
}
