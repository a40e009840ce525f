//! Experiment enumeration over `<root>/<configId>/<runId>` artifact trees

use glob::{glob, Pattern};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{BenchError, BenchResult};
use crate::models::{ConfigId, ExperimentKey, RunId};

/// An artifact tree whose second-level entries are experiment instances.
///
/// Scanning is lazy and restartable: every call to [`ExperimentTree::scan`]
/// walks the filesystem again and, for an unchanged tree, yields the same
/// keys in the same (lexicographic path) order.
#[derive(Debug, Clone)]
pub struct ExperimentTree {
    root: PathBuf,
    partitioned: bool,
}

impl ExperimentTree {
    pub fn new(root: impl Into<PathBuf>, partitioned: bool) -> Self {
        Self {
            root: root.into(),
            partitioned,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn partitioned(&self) -> bool {
        self.partitioned
    }

    /// Start a fresh scan of the tree.
    ///
    /// Entries whose config or run name does not parse are logged and skipped.
    /// Run names are not unique spellings (`hist-00001`, `hist-1`, `1`), so
    /// an entry resolving to a key already yielded is logged and skipped too;
    /// the first one in path order wins.
    pub fn scan(&self) -> BenchResult<impl Iterator<Item = (ExperimentKey, PathBuf)>> {
        let root = self.root.to_str().ok_or_else(|| {
            BenchError::io(
                format!("Non UTF-8 tree root: {}", self.root.display()),
                io::Error::from(io::ErrorKind::InvalidInput),
            )
        })?;
        let pattern = format!("{}/*/*", Pattern::escape(root));
        let paths = glob(&pattern).map_err(|e| {
            BenchError::io(
                format!("Invalid scan pattern {pattern}"),
                io::Error::new(io::ErrorKind::InvalidInput, e.msg),
            )
        })?;

        let partitioned = self.partitioned;
        let mut seen = HashSet::new();
        Ok(paths.filter_map(move |entry| match entry {
            Ok(path) => match key_for_entry(&path, partitioned) {
                Ok(key) if !seen.insert(key) => {
                    warn!(path = %path.display(), key = %key, "duplicate run id, skipping");
                    None
                }
                Ok(key) => Some((key, path)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping tree entry");
                    None
                }
            },
            Err(e) => {
                warn!(path = %e.path().display(), error = %e.error(), "unreadable tree entry");
                None
            }
        }))
    }
}

/// Derive the key of a `<configId>/<runId>` path.
pub fn key_for_entry(path: &Path, partitioned: bool) -> BenchResult<ExperimentKey> {
    let run_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let config_name = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let config = ConfigId::parse(config_name)?;
    let run_id = RunId::parse(run_name)?;
    Ok(ExperimentKey::new(config, run_id, partitioned))
}
