//! Append-only SQLite record of supervised verifier runs
//!
//! One store lives at the root of each verification tree (`stats.db`), so
//! there is one instance per verification-mode × partition-mode pair. Rows
//! are never updated or deleted; for a given key the most recently inserted
//! row is authoritative.

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::BenchResult;
use crate::models::{ConfigId, ExperimentKey, VerificationRun};

/// File name of the store inside a verification tree
pub const STORE_FILE: &str = "stats.db";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS dbcopRuntime(\
    exec_id TEXT, nClient INT, nTransaction INT, nEvent INT, nVariable INT, \
    binaryDuration REAL, algoDuration REAL, timedOut INT, result TEXT, sat INT, \
    returnCode INT, comment TEXT, tag TEXT)";

const SELECT_COLUMNS: &str = "SELECT rowid, exec_id, nClient, nTransaction, nEvent, nVariable, \
    binaryDuration, algoDuration, timedOut, result, sat, returnCode, comment, tag \
    FROM dbcopRuntime";

/// A row as read back from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRun {
    pub row_id: i64,
    pub exec_id: String,
    pub config: ConfigId,
    pub binary_duration: f64,
    pub algo_duration: f64,
    pub timed_out: bool,
    pub result: Option<String>,
    pub sat: bool,
    pub return_code: Option<i32>,
    pub comment: Option<String>,
    pub tag: Option<String>,
}

impl StoredRun {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            row_id: row.get(0)?,
            exec_id: row.get(1)?,
            config: ConfigId::new(row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?),
            binary_duration: row.get(6)?,
            algo_duration: row.get(7)?,
            timed_out: row.get(8)?,
            result: row.get(9)?,
            sat: row.get(10)?,
            return_code: row.get(11)?,
            comment: row.get(12)?,
            tag: row.get(13)?,
        })
    }
}

pub struct RunStore {
    conn: Connection,
    path: PathBuf,
}

impl RunStore {
    /// Open (creating if needed) a writable store and ensure its schema.
    pub fn open(path: &Path) -> BenchResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn, path)?;
        store.ensure_schema()?;
        Ok(store)
    }

    /// Open an existing store for lookups only. `Ok(None)` when it does not exist.
    pub fn open_read_only(path: &Path) -> BenchResult<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::from_connection(conn, path).map(Some)
    }

    pub fn open_in_memory() -> BenchResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self::from_connection(conn, Path::new(":memory:"))?;
        store.ensure_schema()?;
        Ok(store)
    }

    fn from_connection(conn: Connection, path: &Path) -> BenchResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the runtime table if absent. Safe to call repeatedly.
    pub fn ensure_schema(&self) -> BenchResult<()> {
        self.conn.execute(CREATE_TABLE, [])?;
        Ok(())
    }

    /// Append one run. The single INSERT commits on its own.
    pub fn insert(&self, run: &VerificationRun) -> BenchResult<i64> {
        let config = &run.key.config;
        self.conn.execute(
            "INSERT INTO dbcopRuntime (exec_id, nClient, nTransaction, nEvent, nVariable, \
             binaryDuration, algoDuration, timedOut, result, sat, returnCode, comment, tag) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                run.key.run_id.to_string(),
                config.clients,
                config.transactions,
                config.events,
                config.variables,
                run.binary_duration,
                run.algo_duration,
                run.timed_out,
                run.result,
                run.sat,
                run.return_code,
                run.comment,
                run.tag,
            ],
        )?;
        let row_id = self.conn.last_insert_rowid();
        debug!(store = %self.path.display(), row_id, key = %run.key, "run recorded");
        Ok(row_id)
    }

    /// Most recently inserted row for this run id and configuration.
    pub fn latest(&self, key: &ExperimentKey) -> BenchResult<Option<StoredRun>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE exec_id = ?1 AND nClient = ?2 AND nTransaction = ?3 \
             AND nEvent = ?4 AND nVariable = ?5 ORDER BY rowid DESC LIMIT 1"
        );
        let config = &key.config;
        let row = self
            .conn
            .query_row(
                &sql,
                params![
                    key.run_id.to_string(),
                    config.clients,
                    config.transactions,
                    config.events,
                    config.variables,
                ],
                StoredRun::from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// All rows of one batch, in insertion order.
    pub fn rows_for_tag(&self, tag: &str) -> BenchResult<Vec<StoredRun>> {
        let sql = format!("{SELECT_COLUMNS} WHERE tag = ?1 ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![tag], StoredRun::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> BenchResult<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM dbcopRuntime", [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }
}
