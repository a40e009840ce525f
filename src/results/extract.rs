//! Structured outcome extraction from a verifier's result log

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use super::log::{FinalLine, LogReplay};

/// Duration recorded when no self-reported duration exists
pub const NO_DURATION: f64 = -1.0;

/// Fields the verifier writes on the final line of its log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultLine {
    pub result: Option<String>,
    pub duration: f64,
    pub sat: bool,
}

/// Extraction never fails; it reports what state the log is in.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Final line carries `result`, `duration` and `sat`
    Complete(ResultLine),
    /// No log was written
    Missing,
    /// A log exists but its final line is unusable
    Corrupt { reason: String },
}

impl Extraction {
    pub fn result_line(&self) -> Option<&ResultLine> {
        match self {
            Extraction::Complete(line) => Some(line),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Extraction::Complete(_))
    }

    /// Self-reported duration, or [`NO_DURATION`]
    pub fn duration(&self) -> f64 {
        self.result_line().map_or(NO_DURATION, |l| l.duration)
    }

    pub fn label(&self) -> Option<&str> {
        self.result_line().and_then(|l| l.result.as_deref())
    }
}

/// Read a result log and extract its final line.
pub fn extract(path: &Path) -> Extraction {
    let extraction = match LogReplay::from_path(path) {
        Ok(Some(replay)) => from_replay(&replay),
        Ok(None) => Extraction::Missing,
        Err(e) => Extraction::Corrupt {
            reason: format!("unreadable log: {e}"),
        },
    };

    if let Extraction::Corrupt { reason } = &extraction {
        debug!(path = %path.display(), %reason, "result log is corrupt");
    }
    extraction
}

/// Extract from an already replayed log.
pub fn from_replay(replay: &LogReplay) -> Extraction {
    match &replay.final_line {
        None => Extraction::Corrupt {
            reason: "empty log".to_string(),
        },
        Some(FinalLine::Malformed(reason)) => Extraction::Corrupt {
            reason: reason.clone(),
        },
        Some(FinalLine::Object(map)) => match result_line(map) {
            Ok(line) => Extraction::Complete(line),
            Err(reason) => Extraction::Corrupt { reason },
        },
    }
}

fn result_line(map: &Map<String, Value>) -> Result<ResultLine, String> {
    let result = match map.get("result") {
        None => return Err("final line has no `result`".to_string()),
        Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };
    let duration = map
        .get("duration")
        .and_then(Value::as_f64)
        .ok_or_else(|| "final line has no numeric `duration`".to_string())?;
    let sat = map
        .get("sat")
        .and_then(Value::as_bool)
        .ok_or_else(|| "final line has no boolean `sat`".to_string())?;

    Ok(ResultLine {
        result,
        duration,
        sat,
    })
}
