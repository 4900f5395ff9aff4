//! Log record structure

use super::fields::Fields;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;

/// Source location of the call that produced a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub file: String,
    pub line: u32,
    pub function: Option<String>,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            function: None,
        }
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }

    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Parse the `file:line` form written by the encoders
    pub fn parse(s: &str) -> Option<Self> {
        let (file, line) = s.rsplit_once(':')?;
        let line = line.parse().ok()?;
        if file.is_empty() {
            return None;
        }
        Some(Self::new(file, line))
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One frame of a stack trace, in the shape error trackers expect
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StackFrame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abs_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
    #[serde(default)]
    pub in_app: bool,
}

impl StackFrame {
    /// Synthesize a single frame from caller metadata
    pub fn from_caller(caller: &Caller) -> Self {
        let filename = caller
            .file
            .rsplit(['/', '\\'])
            .next()
            .map(str::to_string);
        Self {
            function: caller.function.clone(),
            module: caller.function.clone(),
            filename,
            abs_path: Some(caller.file.clone()),
            lineno: Some(caller.line),
            in_app: true,
        }
    }
}

/// Error attached to a record: its message plus frames when the error carried them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorValue {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<Vec<StackFrame>>,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stacktrace: None,
        }
    }

    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::new(err.to_string())
    }

    #[must_use]
    pub fn with_stacktrace(mut self, frames: Vec<StackFrame>) -> Self {
        self.stacktrace = Some(frames);
        self
    }

    pub fn has_frames(&self) -> bool {
        self.stacktrace.as_ref().is_some_and(|f| !f.is_empty())
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({ "message": self.message }))
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl<E: std::error::Error + 'static> From<&E> for ErrorValue {
    fn from(err: &E) -> Self {
        Self::from_error(err)
    }
}

/// One structured log entry.
///
/// Created when an event builder starts (the timestamp is taken then) and
/// consumed by the terminal call on that builder.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub fields: Fields,
    pub error: Option<ErrorValue>,
    pub timestamp: DateTime<Utc>,
    pub caller: Option<Caller>,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// to prevent attackers from injecting fake log entries.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: impl AsRef<str>) -> Self {
        Self {
            level,
            message: Self::sanitize_message(message.as_ref()),
            fields: Fields::new(),
            error: None,
            timestamp: Utc::now(),
            caller: None,
        }
    }

    pub fn set_message(&mut self, message: &str) {
        self.message = Self::sanitize_message(message);
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: ErrorValue) -> Self {
        self.error = Some(error);
        self
    }
}
