//! Shared fixtures for the batch and join integration tests

use std::fs;
use std::path::Path;

use veribench::batch::{run_batch, BatchConfig, BatchReport};
use veribench::join::{TreeLayout, ARTIFACT_FILE};
use veribench::models::{ConfigId, ConsistencyLevel, ExperimentKey, RunId, VerificationMode};
use veribench::supervisor::{RunOptions, Supervisor, VerifierProgram};

pub const DB: &str = "galera";

/// Stand-in verifier. Positional layout: `$1=-d $2=<in> $3=-o $4=<out>`,
/// followed by the optional `--cons <flag>` and `--sat`.
pub const FAKE_VERIFIER: &str = r#"
out="$4"
mkdir -p "$out"
case " $* " in
  *" --sat "*)
    printf '{"result":"ok","duration":2.5,"sat":true}\n' > "$out/result_log.json" ;;
  *" --cons "*)
    printf '{"result":"ok","duration":1.23,"sat":false}\n' > "$out/result_log.json" ;;
  *)
    printf '{"minViolation":"RepeatableRead"}\n{"number of transactions":null}\n{"minViolation":"Serializable","number of transactions":600}\n{"result":"Serializable","duration":0.5,"sat":false}\n' > "$out/result_log.json" ;;
esac
"#;

pub fn script_verifier(script: &str) -> VerifierProgram {
    VerifierProgram {
        program: "sh".to_string(),
        leading_args: vec!["-c".to_string(), script.to_string(), "verifier".to_string()],
    }
}

pub fn sample_key(partitioned: bool) -> ExperimentKey {
    ExperimentKey::new(ConfigId::new(6, 30, 20, 60), RunId(0), partitioned)
}

/// Create one history directory (with its artifact) per key.
pub fn exec_fixture(layout: &TreeLayout, keys: &[ExperimentKey]) {
    for key in keys {
        let dir = layout.exec_tree(key.partitioned).join(key.relative_dir());
        fs::create_dir_all(&dir).expect("Failed to create history directory");
        fs::write(dir.join(ARTIFACT_FILE), b"history").expect("Failed to write artifact");
    }
}

pub fn mode_options(mode: VerificationMode) -> RunOptions {
    match mode {
        VerificationMode::Algorithmic => RunOptions {
            consistency: Some(ConsistencyLevel::Serializable),
            sat: false,
        },
        VerificationMode::Sat => RunOptions {
            consistency: Some(ConsistencyLevel::Serializable),
            sat: true,
        },
        VerificationMode::ViolationDetection => RunOptions {
            consistency: None,
            sat: false,
        },
    }
}

/// Run a batch of `mode` over one partition of the layout, writing into the
/// tree the join engine will read.
pub fn run_mode(
    layout: &TreeLayout,
    mode: VerificationMode,
    partitioned: bool,
    verifier: &VerifierProgram,
) -> BatchReport {
    let config = BatchConfig {
        input: layout.exec_tree(partitioned),
        output: layout.mode_tree(mode, partitioned),
        partitioned,
        verifier: verifier.clone(),
        options: mode_options(mode),
        tag: format!("it-{mode}"),
        comment: None,
    };
    run_batch(&config, &Supervisor::default()).expect("Batch failed")
}

pub fn layout_in(root: &Path) -> TreeLayout {
    TreeLayout::new(root.join("exec"), root.join("veri"), DB)
}
