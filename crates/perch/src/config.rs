//! Server configuration file support.
//!
//! Loads configuration from `perch.toml` in the working directory. Every
//! field is optional; command-line flags take precedence over file values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Port to serve on
    pub port: Option<u16>,
    /// Directory holding the per-user log files
    pub data_dir: Option<PathBuf>,
    /// Daily work-hours target used by the punch status report
    pub work_hours: Option<f64>,
}

impl ServerConfig {
    /// Load configuration from the given path.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if the file exists and parses successfully
    /// - `Ok(None)` if the file does not exist
    /// - `Err(...)` if the file exists but fails to parse (hard error)
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: ServerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }
}
