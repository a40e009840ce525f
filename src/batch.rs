//! Sequential verification of every experiment in an execution tree
//!
//! One key at a time: run the verifier, read back what it wrote, append one
//! store row. A launch failure stops only the affected key; nothing is
//! retried.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::enumerate::ExperimentTree;
use crate::error::{BenchError, BenchResult};
use crate::models::{ExperimentKey, VerificationRun};
use crate::results::{extract, result_log_path, Extraction, NO_DURATION};
use crate::store::{RunStore, STORE_FILE};
use crate::supervisor::{RunOptions, Supervisor, VerifierProgram};

/// One batch of supervised runs
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Execution tree laid out as `<configId>/<runId>`
    pub input: PathBuf,
    /// Verification tree; mirrors `input` and holds `stats.db`
    pub output: PathBuf,
    pub partitioned: bool,
    pub verifier: VerifierProgram,
    pub options: RunOptions,
    pub tag: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub attempted: usize,
    pub completed: usize,
    pub timed_out: usize,
    pub launch_failures: usize,
}

/// Verify every key of the input tree, continuing past launch failures.
pub fn run_batch(config: &BatchConfig, supervisor: &Supervisor) -> Result<BatchReport> {
    fs::create_dir_all(&config.output).with_context(|| {
        format!(
            "Failed to create verification directory: {}",
            config.output.display()
        )
    })?;

    let store_path = config.output.join(STORE_FILE);
    let store = RunStore::open(&store_path)
        .with_context(|| format!("Failed to open result store: {}", store_path.display()))?;

    let tree = ExperimentTree::new(&config.input, config.partitioned);
    let mut report = BatchReport::default();

    for (key, input_path) in tree.scan()? {
        report.attempted += 1;

        match run_one(supervisor, &store, config, &key, &input_path) {
            Ok(run) => {
                report.completed += 1;
                if run.timed_out {
                    report.timed_out += 1;
                }
            }
            Err(e @ BenchError::ProcessLaunch { .. }) => {
                report.launch_failures += 1;
                warn!(key = %key, error = %e, "verifier did not start, moving on");
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to record run for {key}"));
            }
        }
    }

    info!(
        tag = %config.tag,
        attempted = report.attempted,
        completed = report.completed,
        timed_out = report.timed_out,
        launch_failures = report.launch_failures,
        "batch finished"
    );
    Ok(report)
}

/// Supervise, extract and persist a single key.
pub fn run_one(
    supervisor: &Supervisor,
    store: &RunStore,
    config: &BatchConfig,
    key: &ExperimentKey,
    input_path: &Path,
) -> BenchResult<VerificationRun> {
    let output_dir = config.output.join(key.relative_dir());
    let outcome = supervisor.run(&config.verifier, input_path, &output_dir, &config.options)?;

    let extraction = if outcome.timed_out {
        Extraction::Missing
    } else {
        extract(&result_log_path(&output_dir))
    };
    if let Extraction::Corrupt { reason } = &extraction {
        warn!(key = %key, %reason, "verifier left an unusable result log");
    }

    let line = extraction.result_line();
    let run = VerificationRun {
        key: *key,
        started_at: outcome.started_at,
        finished_at: outcome.finished_at,
        binary_duration: outcome.wall_duration.as_secs_f64(),
        algo_duration: line.map_or(NO_DURATION, |l| l.duration),
        timed_out: outcome.timed_out,
        return_code: outcome.return_code,
        result: line.and_then(|l| l.result.clone()),
        sat: line.map_or(config.options.sat, |l| l.sat),
        comment: config.comment.clone(),
        tag: config.tag.clone(),
    };

    store.insert(&run)?;
    Ok(run)
}
