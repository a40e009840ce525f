//! Verifier command-line construction

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::models::ConsistencyLevel;

/// Default verifier executable
pub const DEFAULT_VERIFIER: &str = "dbcop";

/// The external verifier and any leading arguments (e.g. a subcommand).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierProgram {
    pub program: String,
    #[serde(default)]
    pub leading_args: Vec<String>,
}

impl Default for VerifierProgram {
    fn default() -> Self {
        Self {
            program: DEFAULT_VERIFIER.to_string(),
            leading_args: vec!["verify".to_string()],
        }
    }
}

impl VerifierProgram {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }
}

/// Per-run verifier switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Target level; `None` lets the verifier search for the minimal violation
    pub consistency: Option<ConsistencyLevel>,
    pub sat: bool,
}

/// Arguments after the program name:
/// `<leading args> -d <input> -o <output> [--cons <level>] [--sat]`
pub fn verifier_args(
    verifier: &VerifierProgram,
    input: &Path,
    output: &Path,
    options: &RunOptions,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = verifier.leading_args.iter().map(OsString::from).collect();

    args.push("-d".into());
    args.push(input.as_os_str().to_owned());
    args.push("-o".into());
    args.push(output.as_os_str().to_owned());

    if let Some(flag) = options.consistency.and_then(|c| c.verifier_flag()) {
        args.push("--cons".into());
        args.push(flag.into());
    }

    if options.sat {
        args.push("--sat".into());
    }

    args
}

pub(crate) fn build_command(
    verifier: &VerifierProgram,
    input: &Path,
    output: &Path,
    options: &RunOptions,
) -> Command {
    let mut cmd = Command::new(&verifier.program);
    cmd.args(verifier_args(verifier, input, output, options));
    cmd
}
