//! Adapters for third-party components that only know how to hand over a
//! preformatted line.
//!
//! Both adapters look for a leading level token (`ERR`, `WRN`, `INFO`, ...),
//! strip it and re-emit the rest at that level. Lines without a token are
//! emitted at the adapter's default level (info unless overridden).

use crate::core::error::Result;
use crate::core::{LogLevel, Logger};
use std::fmt;

/// Split a recognized leading level token off `line`.
///
/// The token must be uppercase and followed by whitespace; the returned
/// remainder has its leading whitespace trimmed. Without a token the whole
/// line comes back unchanged.
///
/// ```
/// use rust_log_facade::adapters::parse_level_token;
/// use rust_log_facade::LogLevel;
///
/// assert_eq!(parse_level_token("WRN disk 91%"), (Some(LogLevel::Warn), "disk 91%"));
/// assert_eq!(parse_level_token("ERRORS happen"), (None, "ERRORS happen"));
/// ```
pub fn parse_level_token(line: &str) -> (Option<LogLevel>, &str) {
    let Some((token, rest)) = line.split_once(char::is_whitespace) else {
        return (None, line);
    };

    let level = match token {
        "TRC" | "TRACE" => LogLevel::Trace,
        "DBG" | "DEBUG" => LogLevel::Debug,
        "INF" | "INFO" => LogLevel::Info,
        "WRN" | "WARN" | "WARNING" => LogLevel::Warn,
        "ERR" | "ERROR" => LogLevel::Error,
        "FTL" | "FATAL" => LogLevel::Fatal,
        "PNC" | "PANIC" => LogLevel::Panic,
        _ => return (None, line),
    };

    (Some(level), rest.trim_start())
}

/// Numeric level reported to consumers that ask for one
fn numeric_level(level: LogLevel) -> i32 {
    match level {
        LogLevel::Trace | LogLevel::Debug => 0,
        LogLevel::Info => 1,
        LogLevel::Warn => 2,
        LogLevel::Error => 3,
        LogLevel::Fatal | LogLevel::Panic | LogLevel::NoLevel => 4,
    }
}

/// Sink for components calling `output(calldepth, line)`, such as
/// message-queue clients.
#[derive(Debug, Clone)]
pub struct LineAdapter {
    logger: Logger,
    default_level: LogLevel,
}

impl LineAdapter {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            default_level: LogLevel::Info,
        }
    }

    #[must_use]
    pub fn with_default_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        self
    }

    /// Re-emit one line. `calldepth` is accepted for interface compatibility;
    /// the adapter's own call site is recorded.
    #[track_caller]
    pub fn output(&self, _calldepth: usize, line: &str) -> Result<()> {
        let line = line.trim_end_matches(['\n', '\r']);
        let (level, message) = parse_level_token(line);
        self.logger
            .with_level(level.unwrap_or(self.default_level))
            .try_msg(message)
    }

    /// 0 debug, 1 info, 2 warn, 3 error, 4 disabled
    pub fn log_level(&self) -> i32 {
        numeric_level(self.logger.min_level())
    }
}

/// Sink for components calling `printf`, such as HTTP servers, Kafka clients
/// and migration tools.
#[derive(Debug, Clone)]
pub struct PrintfAdapter {
    logger: Logger,
    default_level: LogLevel,
}

impl PrintfAdapter {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            default_level: LogLevel::Info,
        }
    }

    #[must_use]
    pub fn with_default_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        self
    }

    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        let line = args.to_string();
        let line = line.trim_end_matches(['\n', '\r']);
        let (level, message) = parse_level_token(line);
        self.logger
            .with_level(level.unwrap_or(self.default_level))
            .msg(message);
    }
}
