//! Resource-bounded verifier supervision
//!
//! Runs one external verifier per experiment and records only what the host
//! can observe: wall-clock timing, whether the process had to be killed, and
//! its return code.
//!
//! # Resource controls
//!
//! - **Wall-clock timeout**: 10 minutes by default. On expiry the process is
//!   sent SIGKILL, reaped, and its output streams drained.
//! - **Address space / file size**: 10 GiB each by default, installed in the
//!   child through a [`ResourceLimiter`] so other enforcement mechanisms can
//!   be swapped in without changing [`Supervisor::run`].
//!
//! Runs are strictly sequential; the ceilings assume one verifier on the host
//! at a time.

mod command;
mod config;
mod executor;
mod limits;
mod outcome;

pub use command::{verifier_args, RunOptions, VerifierProgram, DEFAULT_VERIFIER};
pub use config::{ResourceCeilings, DEFAULT_BYTE_CEILING, DEFAULT_WALL_CLOCK_TIMEOUT};
pub use limits::{ResourceLimiter, RlimitLimiter, Unlimited};
pub use outcome::RunOutcome;

use std::path::Path;
use tracing::info;

use crate::error::BenchResult;

/// Launches verifiers under fixed ceilings.
pub struct Supervisor {
    ceilings: ResourceCeilings,
    limiter: Box<dyn ResourceLimiter>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(ResourceCeilings::default())
    }
}

impl Supervisor {
    /// Supervisor enforcing byte ceilings with `setrlimit`
    pub fn new(ceilings: ResourceCeilings) -> Self {
        Self::with_limiter(ceilings, Box::new(RlimitLimiter))
    }

    pub fn with_limiter(ceilings: ResourceCeilings, limiter: Box<dyn ResourceLimiter>) -> Self {
        Self { ceilings, limiter }
    }

    pub fn ceilings(&self) -> &ResourceCeilings {
        &self.ceilings
    }

    /// Run the verifier on `input`, letting it write its result log into `output`.
    pub fn run(
        &self,
        verifier: &VerifierProgram,
        input: &Path,
        output: &Path,
        options: &RunOptions,
    ) -> BenchResult<RunOutcome> {
        let cmd = command::build_command(verifier, input, output, options);
        let outcome = executor::execute(cmd, &self.ceilings, self.limiter.as_ref())?;

        info!(
            input = %input.display(),
            timed_out = outcome.timed_out,
            return_code = ?outcome.return_code,
            wall_ms = outcome.wall_duration.as_millis() as u64,
            "verifier finished: {}",
            outcome.summary()
        );

        Ok(outcome)
    }
}
