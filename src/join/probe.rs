//! Raw execution time of a history, measured by an external utility

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{BenchError, BenchResult};

/// Default duration-measurement utility
pub const DEFAULT_DURATION_PROBE: &str = "history_duration";

/// Measures how long the recorded execution behind an artifact took, in seconds.
pub trait DurationProbe {
    fn measure(&self, artifact: &Path) -> BenchResult<f64>;
}

/// Runs `<program> [args..] <artifact>` and parses a float from its stdout
#[derive(Debug, Clone)]
pub struct CommandDurationProbe {
    program: String,
    leading_args: Vec<String>,
}

impl Default for CommandDurationProbe {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_PROBE)
    }
}

impl CommandDurationProbe {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_args(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }
}

impl DurationProbe for CommandDurationProbe {
    fn measure(&self, artifact: &Path) -> BenchResult<f64> {
        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(artifact)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| BenchError::ProcessLaunch {
                program: self.program.clone(),
                source,
            })?;

        let failure = |reason: String| BenchError::DurationProbe {
            artifact: artifact.to_path_buf(),
            reason,
        };

        if !output.status.success() {
            return Err(failure(format!("{} exited with {}", self.program, output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .trim()
            .parse::<f64>()
            .map_err(|e| failure(format!("unparseable output {:?}: {e}", stdout.trim())))
    }
}

/// Reports the same duration for every artifact
#[derive(Debug, Clone, Copy)]
pub struct FixedDurationProbe(pub f64);

impl DurationProbe for FixedDurationProbe {
    fn measure(&self, _artifact: &Path) -> BenchResult<f64> {
        Ok(self.0)
    }
}
