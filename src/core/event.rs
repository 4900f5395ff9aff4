//! Per-call event builder
//!
//! An [`Event`] is mutable until one of its terminals (`msg`, `msgf`, `send`,
//! `try_msg`, `try_send`) runs. Terminals take the builder by value, so an
//! event can only ever be emitted once:
//!
//! ```compile_fail
//! use rust_log_facade::Logger;
//!
//! let logger = Logger::default();
//! let event = logger.info().str("user", "alice");
//! event.msg("first");
//! event.msg("second"); // use of moved value
//! ```

use super::error::Result;
use super::fields::{FieldValue, Fields};
use super::log_entry::{Caller, ErrorValue, LogRecord, StackFrame};
use super::log_level::LogLevel;
use super::logger::Logger;
use serde::Serialize;
use std::fmt;

/// What happens after the record has been written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminate {
    No,
    /// Shut the remote pipeline down and exit with status 1
    Exit,
    /// Panic with the message
    Panic,
}

/// Builder for one log record
#[must_use = "an event does nothing until `msg`, `msgf` or `send` is called"]
pub struct Event<'a> {
    logger: &'a Logger,
    /// `None` when the level is below the logger's minimum or sampled away
    record: Option<LogRecord>,
    terminate: Terminate,
}

impl<'a> Event<'a> {
    /// `record` is `None` when the level is filtered out or sampled away
    pub(crate) fn new(logger: &'a Logger, record: Option<LogRecord>, terminate: Terminate) -> Self {
        Self {
            logger,
            record,
            terminate,
        }
    }

    /// Whether this event will be written at all
    pub fn enabled(&self) -> bool {
        self.record.is_some()
    }

    pub fn level(&self) -> Option<LogLevel> {
        self.record.as_ref().map(|r| r.level)
    }

    fn push(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        if let Some(ref mut record) = self.record {
            record.fields.push(key, value);
        }
        self
    }

    pub fn str(self, key: &str, value: impl Into<String>) -> Self {
        self.push(key, FieldValue::Str(value.into()))
    }

    pub fn strs<S: AsRef<str>>(self, key: &str, values: &[S]) -> Self {
        let values = values.iter().map(|v| v.as_ref().to_string()).collect();
        self.push(key, FieldValue::Strs(values))
    }

    pub fn int(self, key: &str, value: i64) -> Self {
        self.push(key, FieldValue::Int(value))
    }

    pub fn uint(self, key: &str, value: u64) -> Self {
        self.push(key, FieldValue::Uint(value))
    }

    pub fn float(self, key: &str, value: f64) -> Self {
        self.push(key, FieldValue::Float(value))
    }

    pub fn bool(self, key: &str, value: bool) -> Self {
        self.push(key, FieldValue::Bool(value))
    }

    pub fn field(self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.push(key, value)
    }

    /// Any serializable values, stored as a JSON array.
    ///
    /// If serialization fails the error text is stored instead.
    pub fn interfaces<T: Serialize>(self, key: &str, values: &[T]) -> Self {
        if self.record.is_none() {
            return self;
        }
        let value = match serde_json::to_value(values) {
            Ok(json) => FieldValue::Json(json),
            Err(e) => FieldValue::Str(e.to_string()),
        };
        self.push(key, value)
    }

    /// Nested object
    pub fn object(self, key: &str, fields: Fields) -> Self {
        self.push(key, FieldValue::Object(fields))
    }

    /// Attach the record's error
    pub fn err(self, err: &dyn std::error::Error) -> Self {
        self.error_value(ErrorValue::new(err.to_string()))
    }

    /// Attach an error together with frames it captured
    pub fn stack_err(self, err: &dyn std::error::Error, frames: Vec<StackFrame>) -> Self {
        self.error_value(ErrorValue::new(err.to_string()).with_stacktrace(frames))
    }

    pub fn error_value(mut self, error: ErrorValue) -> Self {
        if let Some(ref mut record) = self.record {
            record.error = Some(error);
        }
        self
    }

    /// Several errors as one list field
    pub fn errs<E: fmt::Display>(self, key: &str, errs: &[E]) -> Self {
        if self.record.is_none() {
            return self;
        }
        let values = errs.iter().map(|e| ErrorValue::new(e.to_string())).collect();
        self.push(key, FieldValue::Errs(values))
    }

    /// Name the function that produced the record
    pub fn caller_fn(mut self, function: &str) -> Self {
        if let Some(caller) = self.record.as_mut().and_then(|r| r.caller.as_mut()) {
            caller.function = Some(function.to_string());
        }
        self
    }

    /// Replace the captured call site
    pub fn caller(mut self, caller: Caller) -> Self {
        if let Some(ref mut record) = self.record {
            record.caller = Some(caller);
        }
        self
    }

    /// Emit with a message. Sink failures go to stderr and the counters.
    pub fn msg(self, message: impl AsRef<str>) {
        if let Err(e) = self.finish(message.as_ref()) {
            eprintln!("[LOGGER ERROR] Failed to write record: {}", e);
        }
    }

    /// Emit with a formatted message; nothing is formatted for a disabled event
    pub fn msgf(self, args: fmt::Arguments<'_>) {
        if self.record.is_none() {
            self.msg("");
            return;
        }
        match args.as_str() {
            Some(s) => self.msg(s),
            None => self.msg(args.to_string()),
        }
    }

    /// Emit with an empty message
    pub fn send(self) {
        self.msg("");
    }

    /// Like [`msg`](Self::msg), returning the primary sink error
    pub fn try_msg(self, message: impl AsRef<str>) -> Result<()> {
        self.finish(message.as_ref())
    }

    pub fn try_send(self) -> Result<()> {
        self.finish("")
    }

    fn finish(self, message: &str) -> Result<()> {
        let Event {
            logger,
            record,
            terminate,
        } = self;

        let (result, message) = match record {
            Some(mut record) => {
                record.set_message(message);
                for hook in logger.hooks() {
                    hook.run(&mut record);
                }
                (logger.emit(&record), record.message)
            }
            None => (Ok(()), message.to_string()),
        };

        match terminate {
            Terminate::No => result,
            Terminate::Panic => panic!("{}", message),
            Terminate::Exit => {
                if let Err(e) = result {
                    eprintln!("[LOGGER ERROR] Failed to write fatal record: {}", e);
                }
                logger.shutdown(logger.flush_timeout());
                std::process::exit(1)
            }
        }
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("record", &self.record)
            .field("terminate", &self.terminate)
            .finish()
    }
}
