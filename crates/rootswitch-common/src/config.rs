//! Configuration model for rootswitch.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{Result, RootSwitchError};

/// Root configuration, usually read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RootSwitchConfig {
    /// System log settings.
    pub syslog: SyslogConfig,
    /// Mode for FIFOs created without an explicit mode.
    pub fifo_mode: u32,
    /// Output format of the diagnostic log.
    pub log_format: LogFormat,
}

impl Default for RootSwitchConfig {
    fn default() -> Self {
        Self {
            syslog: SyslogConfig::default(),
            fifo_mode: constants::DEFAULT_FIFO_MODE,
            log_format: LogFormat::default(),
        }
    }
}

/// System log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyslogConfig {
    /// Whether failures and successes are written to the system log.
    pub enabled: bool,
    /// Identity passed to `openlog(3)`.
    pub ident: String,
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ident: constants::DEFAULT_SYSLOG_IDENT.to_owned(),
        }
    }
}

/// Diagnostic log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl RootSwitchConfig {
    /// Loads the configuration from `path`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if a value is out of range.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading configuration");
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(RootSwitchError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error if the FIFO mode has bits outside `0o7777` or
    /// the syslog identity contains a NUL byte.
    pub fn validate(&self) -> Result<()> {
        if self.fifo_mode & !0o7777 != 0 {
            return Err(RootSwitchError::Config {
                message: format!("fifo_mode {:#o} has bits outside 0o7777", self.fifo_mode),
            });
        }
        if self.syslog.ident.contains('\0') {
            return Err(RootSwitchError::Config {
                message: "syslog.ident must not contain NUL".into(),
            });
        }
        Ok(())
    }
}
