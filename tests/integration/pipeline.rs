//! Batch runs feeding the join engine

use serial_test::serial;
use std::time::Duration;
use tempfile::TempDir;

use veribench::batch::{run_batch, BatchConfig};
use veribench::enumerate::ExperimentTree;
use veribench::join::{FixedDurationProbe, JoinContext, JoinEngine};
use veribench::models::{ConsistencyLevel, VerificationMode, Verdict};
use veribench::store::RunStore;
use veribench::supervisor::{ResourceCeilings, Supervisor};

use super::helpers::*;

#[test]
fn test_algorithmic_and_violation_runs_join_without_sat() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let key = sample_key(false);
    exec_fixture(&layout, &[key]);
    let verifier = script_verifier(FAKE_VERIFIER);

    let algo = run_mode(&layout, VerificationMode::Algorithmic, false, &verifier);
    let inc = run_mode(&layout, VerificationMode::ViolationDetection, false, &verifier);
    assert_eq!(algo.completed, 1);
    assert_eq!(inc.completed, 1);

    let mut ctx = JoinContext::for_layout(&layout);
    assert!(!ctx.sat_available());

    let engine = JoinEngine::new(layout.clone(), Box::new(FixedDurationProbe(40.0)));
    let record = engine.join(&mut ctx, &key).unwrap();

    assert_eq!(record.algo_duration, 1.23);
    assert!(!record.algo_timed_out);
    assert!(!record.algo_killed);
    assert_eq!(record.violation_level, ConsistencyLevel::Serializable);
    assert_eq!(record.total_transactions, 600);
    assert!(record.sat_timed_out);
    assert_eq!(record.sat_killed, None);
    assert_eq!(record.raw_exec_duration, 40.0);
    assert_eq!(
        record.algo_verdict(ConsistencyLevel::Serializable),
        Verdict::Acceptable
    );
}

#[test]
fn test_all_modes_across_both_partitions() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let keys = [sample_key(true), sample_key(false)];
    exec_fixture(&layout, &keys);
    let verifier = script_verifier(FAKE_VERIFIER);

    for partitioned in [true, false] {
        for mode in [
            VerificationMode::Algorithmic,
            VerificationMode::Sat,
            VerificationMode::ViolationDetection,
        ] {
            run_mode(&layout, mode, partitioned, &verifier);
        }
    }

    let mut ctx = JoinContext::for_layout(&layout);
    assert!(ctx.sat_available());

    let engine = JoinEngine::new(layout.clone(), Box::new(FixedDurationProbe(12.3)));
    for partitioned in [true, false] {
        let tree = ExperimentTree::new(layout.exec_tree(partitioned), partitioned);
        for (key, _) in tree.scan().unwrap() {
            let record = engine.join(&mut ctx, &key).unwrap();
            assert_eq!(record.sat_duration, 2.5);
            assert!(!record.sat_timed_out);
            assert_eq!(record.sat_killed, Some(false));
        }
    }

    let summary = ctx.summary();
    assert_eq!(summary.joined, 2);
    assert!(summary.sat_available);
    for partition in &summary.partitions {
        assert_eq!(partition.violations, vec![(ConsistencyLevel::Serializable, 1)]);
        assert_eq!(partition.sat_timeouts, 0);
        assert_eq!(partition.mean_sat_timeout_transactions, None);
    }
    let overhead = summary.overhead_percent.unwrap();
    assert!((overhead - 2.46 * 100.0 / 24.6).abs() < 1e-9);
}

#[test]
fn test_rerun_appends_and_join_uses_latest_row() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let key = sample_key(false);
    exec_fixture(&layout, &[key]);

    run_mode(
        &layout,
        VerificationMode::Algorithmic,
        false,
        &script_verifier(FAKE_VERIFIER),
    );
    run_mode(
        &layout,
        VerificationMode::ViolationDetection,
        false,
        &script_verifier(FAKE_VERIFIER),
    );
    run_mode(
        &layout,
        VerificationMode::Algorithmic,
        false,
        &script_verifier(
            r#"mkdir -p "$4" && printf '{"result":"ok","duration":3.0,"sat":false}\n' > "$4/result_log.json""#,
        ),
    );

    let store =
        RunStore::open(&layout.store_path(VerificationMode::Algorithmic, false)).unwrap();
    assert_eq!(store.count().unwrap(), 2);

    let engine = JoinEngine::new(layout.clone(), Box::new(FixedDurationProbe(1.0)));
    let record = engine
        .join(&mut JoinContext::for_layout(&layout), &key)
        .unwrap();
    assert_eq!(record.algo_duration, 3.0);
}

#[test]
#[serial]
fn test_killed_algorithmic_run_is_timed_out_in_join() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let key = sample_key(false);
    exec_fixture(&layout, &[key]);

    run_mode(
        &layout,
        VerificationMode::ViolationDetection,
        false,
        &script_verifier(FAKE_VERIFIER),
    );

    let config = BatchConfig {
        input: layout.exec_tree(false),
        output: layout.mode_tree(VerificationMode::Algorithmic, false),
        partitioned: false,
        verifier: script_verifier(r#"mkdir -p "$4" && exec sleep 30"#),
        options: mode_options(VerificationMode::Algorithmic),
        tag: "slow".to_string(),
        comment: Some("killed".to_string()),
    };
    let supervisor = Supervisor::new(ResourceCeilings::with_timeout(Duration::from_secs(1)));
    let report = run_batch(&config, &supervisor).unwrap();
    assert_eq!(report.timed_out, 1);

    let row = RunStore::open(&layout.store_path(VerificationMode::Algorithmic, false))
        .unwrap()
        .latest(&key)
        .unwrap()
        .unwrap();
    assert!(row.timed_out);
    assert_eq!(row.result, None);
    assert_eq!(row.return_code, Some(-9));

    let engine = JoinEngine::new(layout.clone(), Box::new(FixedDurationProbe(1.0)));
    let record = engine
        .join(&mut JoinContext::for_layout(&layout), &key)
        .unwrap();
    assert!(record.algo_timed_out);
    assert!(record.algo_killed);
    assert_eq!(
        record.algo_verdict(ConsistencyLevel::Serializable),
        Verdict::TimedOut
    );
}

#[test]
fn test_launch_failure_skips_key_and_continues() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    exec_fixture(&layout, &[sample_key(false)]);

    let config = BatchConfig {
        input: layout.exec_tree(false),
        output: layout.mode_tree(VerificationMode::Algorithmic, false),
        partitioned: false,
        verifier: veribench::supervisor::VerifierProgram::new("/nonexistent/dbcop"),
        options: mode_options(VerificationMode::Algorithmic),
        tag: "broken".to_string(),
        comment: None,
    };
    let report = run_batch(&config, &Supervisor::default()).unwrap();

    assert_eq!(report.attempted, 1);
    assert_eq!(report.launch_failures, 1);
    assert_eq!(report.completed, 0);
    let store = RunStore::open(&config.output.join(veribench::store::STORE_FILE)).unwrap();
    assert_eq!(store.count().unwrap(), 0);
}
