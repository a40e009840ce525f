//! Where each verification mode keeps its results for a database

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{ExperimentKey, VerificationMode};
use crate::results::result_log_path;
use crate::store::STORE_FILE;

/// File name of the raw generated history inside an execution run directory
pub const ARTIFACT_FILE: &str = "history.bincode";

/// Execution and verification tree roots for one database under test.
///
/// ```text
/// <exec_root>/<db>_all_writes            <exec_root>/<db>_partition_writes
/// <veri_root>/<db>_all_writes[_sat|_inc] <veri_root>/<db>_partition_writes[_sat|_inc]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLayout {
    pub exec_root: PathBuf,
    pub veri_root: PathBuf,
    pub db_name: String,
}

impl TreeLayout {
    pub fn new(
        exec_root: impl Into<PathBuf>,
        veri_root: impl Into<PathBuf>,
        db_name: impl Into<String>,
    ) -> Self {
        Self {
            exec_root: exec_root.into(),
            veri_root: veri_root.into(),
            db_name: db_name.into(),
        }
    }

    fn base_name(&self, partitioned: bool) -> String {
        let writes = if partitioned {
            "partition_writes"
        } else {
            "all_writes"
        };
        format!("{}_{writes}", self.db_name)
    }

    /// Root of the raw execution tree
    pub fn exec_tree(&self, partitioned: bool) -> PathBuf {
        self.exec_root.join(self.base_name(partitioned))
    }

    /// Root of one mode's verification tree
    pub fn mode_tree(&self, mode: VerificationMode, partitioned: bool) -> PathBuf {
        self.veri_root.join(format!(
            "{}{}",
            self.base_name(partitioned),
            mode.tree_suffix()
        ))
    }

    pub fn store_path(&self, mode: VerificationMode, partitioned: bool) -> PathBuf {
        self.mode_tree(mode, partitioned).join(STORE_FILE)
    }

    pub fn run_dir(&self, mode: VerificationMode, key: &ExperimentKey) -> PathBuf {
        self.mode_tree(mode, key.partitioned).join(key.relative_dir())
    }

    pub fn result_log(&self, mode: VerificationMode, key: &ExperimentKey) -> PathBuf {
        result_log_path(&self.run_dir(mode, key))
    }

    pub fn artifact_path(&self, key: &ExperimentKey) -> PathBuf {
        self.exec_tree(key.partitioned)
            .join(key.relative_dir())
            .join(ARTIFACT_FILE)
    }

    /// Whether the sat tree exists for every partition mode that was executed.
    ///
    /// With no execution tree at all, only the whole-history sat tree is checked.
    pub fn sat_available(&self) -> bool {
        let mut executed: Vec<bool> = [false, true]
            .into_iter()
            .filter(|&partitioned| self.exec_tree(partitioned).is_dir())
            .collect();
        if executed.is_empty() {
            executed.push(false);
        }
        executed
            .into_iter()
            .all(|partitioned| self.mode_tree(VerificationMode::Sat, partitioned).is_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfigId, RunId};
    use std::fs;
    use tempfile::TempDir;

    fn key(partitioned: bool) -> ExperimentKey {
        ExperimentKey::new(ConfigId::new(6, 30, 20, 60), RunId(0), partitioned)
    }

    #[test]
    fn test_mode_trees() {
        let layout = TreeLayout::new("/exec", "/veri", "galera");
        assert_eq!(
            layout.mode_tree(VerificationMode::Algorithmic, false),
            PathBuf::from("/veri/galera_all_writes")
        );
        assert_eq!(
            layout.mode_tree(VerificationMode::Sat, true),
            PathBuf::from("/veri/galera_partition_writes_sat")
        );
        assert_eq!(
            layout.store_path(VerificationMode::ViolationDetection, false),
            PathBuf::from("/veri/galera_all_writes_inc/stats.db")
        );
    }

    #[test]
    fn test_per_key_paths() {
        let layout = TreeLayout::new("/exec", "/veri", "antidote");
        assert_eq!(
            layout.result_log(VerificationMode::Algorithmic, &key(true)),
            PathBuf::from("/veri/antidote_partition_writes/6_30_20_60/hist-00000/result_log.json")
        );
        assert_eq!(
            layout.artifact_path(&key(false)),
            PathBuf::from("/exec/antidote_all_writes/6_30_20_60/hist-00000/history.bincode")
        );
    }

    #[test]
    fn test_sat_availability_follows_executed_partitions() {
        let temp = TempDir::new().unwrap();
        let layout = TreeLayout::new(temp.path().join("exec"), temp.path().join("veri"), "db");
        assert!(!layout.sat_available());

        fs::create_dir_all(layout.exec_tree(false)).unwrap();
        assert!(!layout.sat_available());

        fs::create_dir_all(layout.mode_tree(VerificationMode::Sat, false)).unwrap();
        assert!(layout.sat_available());

        fs::create_dir_all(layout.exec_tree(true)).unwrap();
        assert!(!layout.sat_available());
    }
}
