//! Mapping from log levels to the remote tracker's severity taxonomy

use crate::core::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity as understood by the error tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }
}

impl From<LogLevel> for Severity {
    /// Trace folds into debug and panic into fatal. Level-less records map to info.
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace | LogLevel::Debug => Severity::Debug,
            LogLevel::Info => Severity::Info,
            LogLevel::Warn => Severity::Warning,
            LogLevel::Error => Severity::Error,
            LogLevel::Fatal | LogLevel::Panic => Severity::Fatal,
            LogLevel::NoLevel => Severity::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
