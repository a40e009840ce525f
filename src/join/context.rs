//! Per-run join state: sat availability and running tallies

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::layout::TreeLayout;
use crate::models::{AggregatedRecord, ConsistencyLevel};

/// State shared by the joins of one reporting pass.
///
/// Created once per pass and handed to every [`super::JoinEngine::join`]
/// call; nothing here is process-wide, and records themselves are never
/// cached.
#[derive(Debug, Clone, Default)]
pub struct JoinContext {
    sat_available: bool,
    violations: [BTreeMap<ConsistencyLevel, usize>; 2],
    sat_timeout_transactions: [Vec<u64>; 2],
    algo_duration_total: f64,
    exec_duration_total: f64,
    joined: usize,
}

/// Counts for one partition mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub partitioned: bool,
    /// Minimal violated level per history, in consistency order
    pub violations: Vec<(ConsistencyLevel, usize)>,
    pub sat_timeouts: usize,
    /// Mean transaction count of histories whose sat run produced no result
    pub mean_sat_timeout_transactions: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSummary {
    pub joined: usize,
    pub sat_available: bool,
    pub partitions: Vec<PartitionSummary>,
    /// Σ algorithmic duration / Σ raw execution duration, as a percentage
    pub overhead_percent: Option<f64>,
}

impl JoinContext {
    pub fn new(sat_available: bool) -> Self {
        Self {
            sat_available,
            ..Self::default()
        }
    }

    /// Compute the sat-availability flag once from the tree layout.
    pub fn for_layout(layout: &TreeLayout) -> Self {
        Self::new(layout.sat_available())
    }

    pub fn sat_available(&self) -> bool {
        self.sat_available
    }

    pub fn joined(&self) -> usize {
        self.joined
    }

    /// Fold one joined record into the tallies.
    pub fn record(&mut self, record: &AggregatedRecord) {
        let slot = usize::from(record.key.partitioned);
        *self.violations[slot]
            .entry(record.violation_level)
            .or_insert(0) += 1;

        if self.sat_available && record.sat_timed_out {
            self.sat_timeout_transactions[slot].push(record.total_transactions);
        }

        self.algo_duration_total += record.algo_duration.max(0.0);
        self.exec_duration_total += record.raw_exec_duration.max(0.0);
        self.joined += 1;
    }

    pub fn summary(&self) -> JoinSummary {
        let partitions = [true, false]
            .into_iter()
            .map(|partitioned| {
                let slot = usize::from(partitioned);
                let violations = ConsistencyLevel::ALL
                    .into_iter()
                    .filter_map(|level| {
                        self.violations[slot]
                            .get(&level)
                            .map(|&count| (level, count))
                    })
                    .collect();
                let timeouts = &self.sat_timeout_transactions[slot];
                let mean = (!timeouts.is_empty())
                    .then(|| timeouts.iter().sum::<u64>() as f64 / timeouts.len() as f64);

                PartitionSummary {
                    partitioned,
                    violations,
                    sat_timeouts: timeouts.len(),
                    mean_sat_timeout_transactions: mean,
                }
            })
            .collect();

        let overhead_percent = (self.exec_duration_total > 0.0)
            .then(|| self.algo_duration_total * 100.0 / self.exec_duration_total);

        JoinSummary {
            joined: self.joined,
            sat_available: self.sat_available,
            partitions,
            overhead_percent,
        }
    }
}
