//! Log level definitions

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace = 0,
    #[default]
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
    Panic = 6,
    /// Records from [`Logger::log`](super::Logger::log). Passes every
    /// minimum level and is never forwarded to the remote tracker.
    NoLevel = 7,
}

impl LogLevel {
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Panic,
    ];

    /// Lowercase name, as written in JSON records and config files
    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Panic => "panic",
            LogLevel::NoLevel => "",
        }
    }

    /// Three-letter marker used by the console encoder
    pub fn marker(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRC",
            LogLevel::Debug => "DBG",
            LogLevel::Info => "INF",
            LogLevel::Warn => "WRN",
            LogLevel::Error => "ERR",
            LogLevel::Fatal => "FTL",
            LogLevel::Panic => "PNC",
            LogLevel::NoLevel => "???",
        }
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => Magenta,
            LogLevel::Debug => Yellow,
            LogLevel::Info => Green,
            LogLevel::Warn => Red,
            LogLevel::Error => BrightRed,
            LogLevel::Fatal => BrightRed,
            LogLevel::Panic => BrightRed,
            LogLevel::NoLevel => White,
        }
    }

    /// Parse a level from config, where an empty string means `debug`
    pub fn from_config(s: &str) -> Result<Self, LoggerError> {
        if s.trim().is_empty() {
            return Ok(LogLevel::default());
        }
        s.parse()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            "panic" => Ok(LogLevel::Panic),
            _ => Err(LoggerError::invalid_level(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("Panic".parse::<LogLevel>().unwrap(), LogLevel::Panic);
        assert!("fart".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_from_config_empty_defaults_to_debug() {
        assert_eq!(LogLevel::from_config("").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_config("  ").unwrap(), LogLevel::Debug);
        assert!(LogLevel::from_config("fart").is_err());
    }

    #[test]
    fn test_markers() {
        let markers: Vec<_> = LogLevel::ALL.iter().map(|l| l.marker()).collect();
        assert_eq!(markers, ["TRC", "DBG", "INF", "WRN", "ERR", "FTL", "PNC"]);
    }

    #[test]
    fn test_no_level_sorts_above_every_level() {
        assert!(LogLevel::ALL.iter().all(|&l| LogLevel::NoLevel > l));
        assert!(!LogLevel::ALL.contains(&LogLevel::NoLevel));
        assert!("".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        let level: LogLevel = serde_json::from_str("\"fatal\"").unwrap();
        assert_eq!(level, LogLevel::Fatal);
    }
}
