//! Join behaviour when sat results are absent or incomplete

use tempfile::TempDir;

use veribench::join::{FixedDurationProbe, JoinContext, JoinEngine};
use veribench::models::{ConfigId, ExperimentKey, RunId, VerificationMode};
use veribench::BenchError;

use super::helpers::*;

#[test]
fn test_sat_tree_for_one_partition_only_disables_sat() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let keys = [sample_key(true), sample_key(false)];
    exec_fixture(&layout, &keys);
    let verifier = script_verifier(FAKE_VERIFIER);

    for partitioned in [true, false] {
        run_mode(&layout, VerificationMode::Algorithmic, partitioned, &verifier);
        run_mode(&layout, VerificationMode::ViolationDetection, partitioned, &verifier);
    }
    run_mode(&layout, VerificationMode::Sat, false, &verifier);

    let mut ctx = JoinContext::for_layout(&layout);
    assert!(!ctx.sat_available());

    let engine = JoinEngine::new(layout.clone(), Box::new(FixedDurationProbe(5.0)));
    for key in &keys {
        let record = engine.join(&mut ctx, key).unwrap();
        assert!(record.sat_timed_out);
        assert_eq!(record.sat_killed, None);
    }

    let summary = ctx.summary();
    assert_eq!(summary.joined, 2);
    assert!(summary.partitions.iter().all(|p| p.sat_timeouts == 0));
}

#[test]
fn test_missing_sat_row_is_reported() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let other = ExperimentKey::new(ConfigId::new(6, 30, 20, 60), RunId(1), false);
    exec_fixture(&layout, &[sample_key(false)]);
    let verifier = script_verifier(FAKE_VERIFIER);

    run_mode(&layout, VerificationMode::Algorithmic, false, &verifier);
    run_mode(&layout, VerificationMode::Sat, false, &verifier);
    run_mode(&layout, VerificationMode::ViolationDetection, false, &verifier);

    // A history added after the sat batch ran
    exec_fixture(&layout, &[other]);
    run_mode(&layout, VerificationMode::Algorithmic, false, &verifier);
    run_mode(&layout, VerificationMode::ViolationDetection, false, &verifier);

    let mut ctx = JoinContext::for_layout(&layout);
    assert!(ctx.sat_available());

    let engine = JoinEngine::new(layout.clone(), Box::new(FixedDurationProbe(5.0)));
    engine.join(&mut ctx, &sample_key(false)).unwrap();

    let err = engine.join(&mut ctx, &other).unwrap_err();
    match err {
        BenchError::MissingRun { mode, key, .. } => {
            assert_eq!(mode, VerificationMode::Sat);
            assert_eq!(key, other);
        }
        e => panic!("unexpected error: {e}"),
    }
    assert_eq!(ctx.joined(), 1);
}
