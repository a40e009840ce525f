//! Pluggable enforcement of byte ceilings on a child process

use nix::sys::resource::{getrlimit, setrlimit, Resource};
use std::io;
use std::os::unix::process::CommandExt;
use std::process::Command;

use super::config::ResourceCeilings;

/// Installs OS-level limits on a command before it is spawned.
///
/// Limits are scoped to the child (and anything it forks), never to the
/// supervising process.
pub trait ResourceLimiter: Send + Sync {
    fn apply(&self, command: &mut Command, ceilings: &ResourceCeilings);

    fn name(&self) -> &'static str;
}

/// `setrlimit(RLIMIT_AS)` and `setrlimit(RLIMIT_FSIZE)` in the forked child
#[derive(Debug, Default, Clone, Copy)]
pub struct RlimitLimiter;

impl ResourceLimiter for RlimitLimiter {
    fn apply(&self, command: &mut Command, ceilings: &ResourceCeilings) {
        let address_space = ceilings.address_space_limit;
        let file_size = ceilings.file_size_limit;

        // SAFETY: the closure runs between fork and exec and only calls
        // getrlimit(2)/setrlimit(2), which are async-signal-safe. It allocates nothing.
        unsafe {
            command.pre_exec(move || {
                lower_limit(Resource::RLIMIT_AS, address_space)?;
                lower_limit(Resource::RLIMIT_FSIZE, file_size)?;
                Ok(())
            });
        }
    }

    fn name(&self) -> &'static str {
        "rlimit"
    }
}

/// Set both soft and hard limit, never above the inherited hard limit.
fn lower_limit(resource: Resource, ceiling: u64) -> io::Result<()> {
    let (_, hard) = getrlimit(resource).map_err(io::Error::from)?;
    let limit = ceiling.min(hard);
    setrlimit(resource, limit, limit).map_err(io::Error::from)
}

/// Leaves the child unrestricted apart from the wall-clock timeout
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

impl ResourceLimiter for Unlimited {
    fn apply(&self, _command: &mut Command, _ceilings: &ResourceCeilings) {}

    fn name(&self) -> &'static str {
        "unlimited"
    }
}
