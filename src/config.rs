//! Logger configuration
//!
//! Loaded once at startup (usually from YAML) and handed to
//! [`Logger::init`](crate::Logger::init). A logger never re-reads its config;
//! build a new logger to change it.

use crate::core::call_site::DEFAULT_SKIP_FRAMES;
use crate::core::error::{LoggerError, Result};
use crate::core::{LogLevel, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the deployment stage
pub const STAGE_ENV: &str = "STAGE";

/// Stage used when [`STAGE_ENV`] is unset
pub const DEFAULT_STAGE: &str = "development";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Deployment stage from the environment
pub fn stage_from_env() -> String {
    env_or(STAGE_ENV, DEFAULT_STAGE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallerConfig {
    #[serde(alias = "hide_caller")]
    pub disabled: bool,

    /// Frames between the logging call and the reported call site. 2 is the
    /// direct caller of the level method; each extra frame walks one caller
    /// further up, which needs debug info in the binary.
    pub skip_frames: usize,
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            skip_frames: DEFAULT_SKIP_FRAMES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub enable: bool,
    pub dsn: String,
    pub debug: bool,
    /// Capacity of the delivery channel
    pub buffer_size: usize,
    /// Upper bound for one delivery
    pub flush_timeout_ms: u64,
}

impl RemoteConfig {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            enable: true,
            dsn: dsn.into(),
            ..Self::default()
        }
    }

    /// Enabled and pointing somewhere
    pub fn is_active(&self) -> bool {
        self.enable && !self.dsn.trim().is_empty()
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enable: false,
            dsn: String::new(),
            debug: false,
            buffer_size: 1024,
            flush_timeout_ms: 1000,
        }
    }
}

/// Process-wide logger configuration
///
/// # Example
///
/// ```
/// use rust_log_facade::Config;
///
/// let config = Config::from_yaml_str(
///     "level: info\nformat: json\nsentry:\n  enable: false\n",
/// )
/// .unwrap();
///
/// assert_eq!(config.level, "info");
/// assert!(!config.remote.unwrap().enable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub level: String,
    pub format: String,
    pub color: bool,
    pub caller: CallerConfig,
    #[serde(alias = "sentry", skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: String::new(),
            format: String::new(),
            color: true,
            caller: CallerConfig::default(),
            remote: None,
        }
    }
}

impl Config {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_caller_disabled(mut self, disabled: bool) -> Self {
        self.caller.disabled = disabled;
        self
    }

    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading config",
                format!("cannot read {}", path.display()),
                e,
            )
        })?;
        Self::from_yaml_str(&content)
    }

    /// Check every field that Init would reject
    pub fn validate(&self) -> Result<()> {
        self.min_level()?;
        self.output_format()?;
        if let Some(remote) = self.active_remote() {
            if remote.flush_timeout_ms == 0 {
                return Err(LoggerError::config(
                    "remote",
                    "flush_timeout_ms must be greater than zero",
                ));
            }
        }
        Ok(())
    }

    /// Parsed level; empty means debug
    pub fn min_level(&self) -> Result<LogLevel> {
        LogLevel::from_config(&self.level)
    }

    /// Parsed format; empty means text
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.format.parse()
    }

    /// Remote section when it is both enabled and has a DSN
    pub fn active_remote(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref().filter(|r| r.is_active())
    }
}

/// Metadata of the process doing the logging
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub stage: String,
    pub name: String,
    pub version: String,
}

impl ServiceInfo {
    pub fn new(
        stage: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            stage: stage.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Stage taken from `STAGE`
    pub fn from_env(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(stage_from_env(), name, version)
    }

    /// `name@version`, or just the name when the version is empty
    pub fn release(&self) -> Option<String> {
        match (self.name.is_empty(), self.version.is_empty()) {
            (true, _) => None,
            (false, true) => Some(self.name.clone()),
            (false, false) => Some(format!("{}@{}", self.name, self.version)),
        }
    }
}
