//! Reconciling scattered result trees into one record per experiment
//!
//! For a key, the engine combines:
//!
//! - the latest algorithmic-mode store row (mandatory),
//! - the latest sat-mode store row (mandatory only when sat data exists),
//! - the violation-detection log, replayed line by line,
//! - each mode's own result log, as proof that it produced a usable result,
//! - the raw execution time reported by the duration probe.
//!
//! A mode whose log is missing or unusable counts as timed out no matter
//! what the supervisor recorded; the supervisor's view is kept separately in
//! the `*_killed` fields.

mod context;
mod layout;
mod probe;

pub use context::{JoinContext, JoinSummary, PartitionSummary};
pub use layout::{TreeLayout, ARTIFACT_FILE};
pub use probe::{CommandDurationProbe, DurationProbe, FixedDurationProbe, DEFAULT_DURATION_PROBE};

use tracing::debug;

use crate::error::{BenchError, BenchResult};
use crate::models::{AggregatedRecord, ConsistencyLevel, ExperimentKey, VerificationMode};
use crate::results::{extract, LogReplay, NO_DURATION};
use crate::store::{RunStore, StoredRun};

pub struct JoinEngine {
    layout: TreeLayout,
    probe: Box<dyn DurationProbe>,
}

impl JoinEngine {
    pub fn new(layout: TreeLayout, probe: Box<dyn DurationProbe>) -> Self {
        Self { layout, probe }
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    /// Build the aggregated record of one key and fold it into `ctx`.
    pub fn join(&self, ctx: &mut JoinContext, key: &ExperimentKey) -> BenchResult<AggregatedRecord> {
        let algo_row = self.mandatory_row(VerificationMode::Algorithmic, key)?;
        let sat_row = if ctx.sat_available() {
            Some(self.mandatory_row(VerificationMode::Sat, key)?)
        } else {
            None
        };

        let (violation_level, total_transactions) = self.violation_data(key)?;

        let algo_timed_out = !self.has_usable_result(VerificationMode::Algorithmic, key);
        let sat_timed_out =
            sat_row.is_none() || !self.has_usable_result(VerificationMode::Sat, key);

        let raw_exec_duration = self.probe.measure(&self.layout.artifact_path(key))?;

        let record = AggregatedRecord {
            key: *key,
            violation_level,
            total_transactions,
            sat_duration: sat_row.as_ref().map_or(NO_DURATION, |r| r.algo_duration),
            sat_timed_out,
            sat_killed: sat_row.as_ref().map(|r| r.timed_out),
            algo_duration: algo_row.algo_duration,
            algo_timed_out,
            algo_killed: algo_row.timed_out,
            raw_exec_duration,
        };

        debug!(
            key = %key,
            level = %record.violation_level,
            algo_timed_out,
            sat_timed_out,
            "joined experiment"
        );
        ctx.record(&record);
        Ok(record)
    }

    fn mandatory_row(&self, mode: VerificationMode, key: &ExperimentKey) -> BenchResult<StoredRun> {
        let store_path = self.layout.store_path(mode, key.partitioned);
        let missing = || BenchError::MissingRun {
            mode,
            key: *key,
            store: store_path.clone(),
        };

        let store = RunStore::open_read_only(&store_path)?.ok_or_else(missing)?;
        store.latest(key)?.ok_or_else(missing)
    }

    /// Last reported minimal violation and transaction count.
    fn violation_data(&self, key: &ExperimentKey) -> BenchResult<(ConsistencyLevel, u64)> {
        let path = self
            .layout
            .result_log(VerificationMode::ViolationDetection, key);

        let replay = LogReplay::from_path(&path)
            .map_err(|e| BenchError::ViolationLog {
                path: path.clone(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| BenchError::ViolationLog {
                path: path.clone(),
                reason: "log does not exist".to_string(),
            })?;

        let level = replay
            .min_violation
            .as_deref()
            .ok_or_else(|| BenchError::ViolationLog {
                path: path.clone(),
                reason: "no `minViolation` entry".to_string(),
            })?
            .parse::<ConsistencyLevel>()?;
        let transactions = replay
            .transactions
            .ok_or(BenchError::MissingTransactionCount { path })?;

        Ok((level, transactions))
    }

    fn has_usable_result(&self, mode: VerificationMode, key: &ExperimentKey) -> bool {
        extract(&self.layout.result_log(mode, key)).is_complete()
    }
}
