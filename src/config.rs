//! Harness configuration: TOML file, environment overrides, then CLI flags

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::join::{CommandDurationProbe, DEFAULT_DURATION_PROBE};
use crate::supervisor::{
    ResourceCeilings, VerifierProgram, DEFAULT_BYTE_CEILING, DEFAULT_WALL_CLOCK_TIMEOUT,
};

/// Environment variable naming the root of the execution trees
pub const EXEC_ROOT_ENV: &str = "DBCOP_INP_DIR";

/// Environment variable naming the root of the verification trees
pub const VERI_ROOT_ENV: &str = "DBCOP_OUT_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub verifier: String,
    pub verifier_args: Vec<String>,
    pub duration_probe: String,
    pub timeout_secs: u64,
    pub address_space_limit: u64,
    pub file_size_limit: u64,
    pub exec_root: Option<PathBuf>,
    pub veri_root: Option<PathBuf>,
    pub db_name: Option<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        let verifier = VerifierProgram::default();
        Self {
            verifier: verifier.program,
            verifier_args: verifier.leading_args,
            duration_probe: DEFAULT_DURATION_PROBE.to_string(),
            timeout_secs: DEFAULT_WALL_CLOCK_TIMEOUT.as_secs(),
            address_space_limit: DEFAULT_BYTE_CEILING,
            file_size_limit: DEFAULT_BYTE_CEILING,
            exec_root: None,
            veri_root: None,
            db_name: None,
        }
    }
}

impl BenchConfig {
    /// Load from a TOML file, or defaults when no file is given or it does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: BenchConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.verifier.trim().is_empty() {
            anyhow::bail!("Config {} has an empty `verifier`", path.display());
        }
        Ok(config)
    }

    /// Apply `DBCOP_INP_DIR` / `DBCOP_OUT_DIR` from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(EXEC_ROOT_ENV).filter(|v| !v.is_empty()) {
            self.exec_root = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup(VERI_ROOT_ENV).filter(|v| !v.is_empty()) {
            self.veri_root = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn verifier_program(&self) -> VerifierProgram {
        VerifierProgram {
            program: self.verifier.clone(),
            leading_args: self.verifier_args.clone(),
        }
    }

    pub fn ceilings(&self) -> ResourceCeilings {
        ResourceCeilings {
            address_space_limit: self.address_space_limit,
            file_size_limit: self.file_size_limit,
            wall_clock_timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn probe(&self) -> CommandDurationProbe {
        CommandDurationProbe::new(&self.duration_probe)
    }
}
