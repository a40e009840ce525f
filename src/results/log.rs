//! Single-pass replay of a line-delimited JSON result log

use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

pub const MIN_VIOLATION_FIELD: &str = "minViolation";
pub const TRANSACTIONS_FIELD: &str = "number of transactions";

/// State of the final non-blank line of a log
#[derive(Debug, Clone, PartialEq)]
pub enum FinalLine {
    Object(Map<String, Value>),
    Malformed(String),
}

/// Fold of every line of a result log.
///
/// Later lines override earlier ones: `min_violation` and `transactions`
/// keep the last non-null value seen, `final_line` is the last non-blank line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogReplay {
    pub lines: usize,
    pub malformed_lines: usize,
    pub final_line: Option<FinalLine>,
    pub min_violation: Option<String>,
    pub transactions: Option<u64>,
}

impl LogReplay {
    /// Apply one raw line.
    pub fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.lines += 1;

        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => {
                if let Some(level) = map.get(MIN_VIOLATION_FIELD).and_then(value_as_label) {
                    self.min_violation = Some(level);
                }
                if let Some(n) = map.get(TRANSACTIONS_FIELD).and_then(value_as_count) {
                    self.transactions = Some(n);
                }
                self.final_line = Some(FinalLine::Object(map));
            }
            Ok(other) => {
                self.malformed_lines += 1;
                self.final_line = Some(FinalLine::Malformed(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                )));
            }
            Err(e) => {
                self.malformed_lines += 1;
                self.final_line = Some(FinalLine::Malformed(e.to_string()));
            }
        }
    }

    /// Apply one raw line that may not be valid UTF-8.
    pub fn push_bytes(&mut self, raw: &[u8]) {
        match std::str::from_utf8(raw) {
            Ok(line) => self.push_line(line),
            Err(e) => {
                self.lines += 1;
                self.malformed_lines += 1;
                self.final_line = Some(FinalLine::Malformed(format!("invalid UTF-8: {e}")));
            }
        }
    }

    /// Replay all lines of a reader. Only I/O failures are errors.
    pub fn from_reader<R: BufRead>(mut reader: R) -> io::Result<Self> {
        let mut replay = Self::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            replay.push_bytes(&buf);
        }
        Ok(replay)
    }

    /// Replay a log file. `Ok(None)` when the file does not exist.
    pub fn from_path(path: &Path) -> io::Result<Option<Self>> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let replay = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            lines = replay.lines,
            malformed = replay.malformed_lines,
            "replayed result log"
        );
        Ok(Some(replay))
    }
}

fn value_as_label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Transaction counts may be written as integers, floats or numeric strings.
fn value_as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
