//! Tests for the `veribench` binary

use std::fs;
use std::process::Command;
use tempfile::TempDir;

use veribench::models::VerificationMode;
use veribench::store::RunStore;

use super::helpers::*;

fn veribench() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_veribench"));
    cmd.env_remove("DBCOP_INP_DIR")
        .env_remove("DBCOP_OUT_DIR")
        .env("VERIBENCH_LOG", "warn");
    cmd
}

#[test]
fn test_verify_command_records_rows() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    exec_fixture(&layout, &[sample_key(false)]);

    let config_path = temp.path().join("bench.toml");
    let content = format!(
        "verifier = \"sh\"\ntimeout_secs = 20\nverifier_args = [\"-c\", '''{FAKE_VERIFIER}''', \"verifier\"]\n"
    );
    fs::write(&config_path, content).unwrap();

    let out = layout.mode_tree(VerificationMode::Algorithmic, false);
    let output = veribench()
        .arg("--config")
        .arg(&config_path)
        .arg("verify")
        .arg("--inp")
        .arg(layout.exec_tree(false))
        .arg("--out")
        .arg(&out)
        .args(["--tag", "cli", "--consistency", "ser"])
        .output()
        .expect("Failed to run veribench");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let row = RunStore::open(&layout.store_path(VerificationMode::Algorithmic, false))
        .unwrap()
        .latest(&sample_key(false))
        .unwrap()
        .unwrap();
    assert_eq!(row.algo_duration, 1.23);
    assert_eq!(row.tag.as_deref(), Some("cli"));
}

#[test]
fn test_join_without_roots_fails() {
    let output = veribench()
        .args(["join", "galera"])
        .output()
        .expect("Failed to run veribench");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No execution root"));
}

#[test]
fn test_unknown_consistency_level_is_rejected() {
    let temp = TempDir::new().unwrap();
    let output = veribench()
        .arg("verify")
        .arg("--inp")
        .arg(temp.path())
        .arg("--out")
        .arg(temp.path().join("out"))
        .args(["--tag", "x", "--consistency", "linearizable"])
        .output()
        .expect("Failed to run veribench");

    assert!(!output.status.success());
}
