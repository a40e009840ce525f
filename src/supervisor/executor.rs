//! Spawning, timed waiting and output draining for one verifier process

use chrono::Utc;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::io::Read;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use super::config::ResourceCeilings;
use super::limits::ResourceLimiter;
use super::outcome::RunOutcome;
use crate::error::{BenchError, BenchResult};

/// Timeout for collecting output from child process pipes
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum captured output per stream (10MB)
const MAX_OUTPUT_SIZE: usize = 10 * 1024 * 1024;

/// Run a prepared command to completion or until the wall-clock budget expires.
///
/// A spawn failure is returned as [`BenchError::ProcessLaunch`]. Every other
/// path yields a well-formed [`RunOutcome`]: on timeout the child's whole
/// process group is killed, the child is reaped, and its streams are drained
/// before returning.
pub(crate) fn execute(
    mut cmd: Command,
    ceilings: &ResourceCeilings,
    limiter: &dyn ResourceLimiter,
) -> BenchResult<RunOutcome> {
    let program = cmd.get_program().to_string_lossy().into_owned();

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0);
    limiter.apply(&mut cmd, ceilings);

    let started_at = Utc::now();
    let start = Instant::now();

    let mut child = cmd
        .spawn()
        .map_err(|source| BenchError::ProcessLaunch { program, source })?;
    debug!(pid = child.id(), limiter = limiter.name(), "verifier started");

    // Drain concurrently with waiting: a child blocked on a full pipe would
    // otherwise never exit.
    let stdout_rx = spawn_drain(child.stdout.take());
    let stderr_rx = spawn_drain(child.stderr.take());

    let (status, timed_out) = match child.wait_timeout(ceilings.wall_clock_timeout) {
        Ok(Some(status)) => (Some(status), false),
        Ok(None) => (kill_child_process(&mut child), true),
        Err(e) => {
            warn!(error = %e, "waiting on verifier failed, killing it");
            (kill_child_process(&mut child), false)
        }
    };

    let wall_duration = start.elapsed();
    let finished_at = Utc::now();

    let stdout = collect(stdout_rx);
    let stderr = collect(stderr_rx);

    Ok(RunOutcome {
        started_at,
        finished_at,
        wall_duration,
        timed_out,
        return_code: status.and_then(return_code),
        stdout,
        stderr,
    })
}

/// Exit code, or `-signal` for a signal-terminated process.
fn return_code(status: ExitStatus) -> Option<i32> {
    status.code().or_else(|| status.signal().map(|sig| -sig))
}

fn spawn_drain<R: Read + Send + 'static>(stream: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(stream) => {
            thread::spawn(move || {
                let _ = tx.send(read_stream_to_string(stream));
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

fn collect(rx: mpsc::Receiver<String>) -> String {
    rx.recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string())
}

/// Read a stream to string, keeping at most `MAX_OUTPUT_SIZE` bytes.
///
/// The remainder is still read and discarded so the writer never sees a
/// broken pipe.
fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut truncated = false;

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                let to_copy = n.min(remaining);
                buf.extend_from_slice(&chunk[..to_copy]);
                truncated |= to_copy < n;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => {
                if buf.is_empty() {
                    return "[error reading output]".to_string();
                }
                break;
            }
        }
    }

    if truncated {
        buf.extend_from_slice(b"\n[output truncated at 10MB]");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// SIGKILL the child's process group and reap the child.
///
/// The verifier may have forked helpers (e.g. a sat solver) that hold its
/// pipes open; they share the group the child leads.
fn kill_child_process(child: &mut Child) -> Option<ExitStatus> {
    let pgid = Pid::from_raw(child.id() as i32);
    if let Err(e) = killpg(pgid, Signal::SIGKILL) {
        // The group may already be gone; fall back to the child alone.
        debug!(error = %e, "killpg failed, killing verifier directly");
        let _ = child.kill();
    }
    child.wait().ok()
}
