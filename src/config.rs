//! Logging configuration, read from the environment or a TOML file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::OdmError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for log files; the current directory when unset.
    pub dir: Option<PathBuf>,
    /// error|warn|info|debug|trace
    pub level: String,
    /// Number of rolled files to keep.
    pub retention: u32,
    /// Route `devlog!` records to `dev.log`.
    pub dev_log: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { dir: None, level: "info".to_string(), retention: 7, dev_log: false }
    }
}

impl LoggingConfig {
    /// Overrides defaults with `ODM_QUERY_LOG_DIR`, `ODM_QUERY_LOG_LEVEL`,
    /// `ODM_QUERY_LOG_RETENTION` and `ODM_QUERY_DEV_LOG` when present.
    pub fn from_env() -> Self {
        Self::default().merge_env(|k| std::env::var(k).ok())
    }

    fn merge_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = var("ODM_QUERY_LOG_DIR") {
            self.dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = var("ODM_QUERY_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(n) = var("ODM_QUERY_LOG_RETENTION").and_then(|s| s.parse::<u32>().ok()) {
            self.retention = n;
        }
        if let Some(dev) = var("ODM_QUERY_DEV_LOG") {
            self.dev_log = matches!(dev.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }

    /// # Errors
    /// Returns `OdmError::Toml` for malformed input.
    pub fn from_toml_str(s: &str) -> Result<Self, OdmError> {
        Ok(toml::from_str(s)?)
    }

    /// # Errors
    /// Returns `OdmError::Io` when the file cannot be read, `OdmError::Toml` when it cannot be parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, OdmError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| OdmError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        match self.level.to_ascii_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}
