//! What the supervisor observed about one verifier process

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Timing and exit status of one supervised run.
///
/// The supervisor never interprets verifier semantics; the result log the
/// verifier wrote is read separately by the extractor.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub wall_duration: Duration,
    /// The process outlived the wall-clock budget and was killed
    pub timed_out: bool,
    /// Exit code, or the negated signal number when killed by a signal
    pub return_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutcome {
    /// Summary line for logs
    pub fn summary(&self) -> String {
        let status = if self.timed_out {
            "TIMEOUT"
        } else if self.return_code == Some(0) {
            "EXITED"
        } else {
            "FAILED"
        };
        format!(
            "{} ({}ms, return code: {:?})",
            status,
            self.wall_duration.as_millis(),
            self.return_code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(timed_out: bool, return_code: Option<i32>) -> RunOutcome {
        let now = Utc::now();
        RunOutcome {
            started_at: now,
            finished_at: now,
            wall_duration: Duration::from_millis(250),
            timed_out,
            return_code,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    #[test]
    fn test_summary_variants() {
        assert!(outcome(false, Some(0)).summary().starts_with("EXITED"));
        assert!(outcome(false, Some(2)).summary().contains("return code: Some(2)"));
        let timeout = outcome(true, Some(-9)).summary();
        assert!(timeout.starts_with("TIMEOUT"));
        assert!(timeout.contains("250ms"));
    }
}
