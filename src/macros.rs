//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. They also record the
//! enclosing module as the caller's function. Nothing is formatted when the
//! level is disabled.
//!
//! # Examples
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::info;
//!
//! let logger = Logger::default();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message at a runtime level.
///
/// Never exits or panics, even for `Fatal` and `Panic`.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::default();
/// use rust_log_facade::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger
            .with_level($level)
            .caller_fn(module_path!())
            .msgf(format_args!($($arg)+))
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::default().level(LogLevel::Trace);
/// use rust_log_facade::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::default();
/// use rust_log_facade::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::sink::BufferWriter;
    use crate::core::{LogLevel, Logger};

    fn logger() -> (Logger, BufferWriter) {
        let buffer = BufferWriter::new();
        let logger = Logger::builder()
            .level("trace")
            .format("json")
            .writer(buffer.clone())
            .build()
            .unwrap();
        (logger, buffer)
    }

    #[test]
    fn test_log_macro() {
        let (logger, buffer) = logger();
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Info, "Formatted: {}", 42);

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"message\":\"Formatted: 42\""));
    }

    #[test]
    fn test_level_macros() {
        let (logger, buffer) = logger();
        trace!(logger, "Value: {}", 10);
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);

        let levels: Vec<String> = buffer
            .lines()
            .iter()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["level"].to_string())
            .collect();
        assert_eq!(
            levels,
            ["\"trace\"", "\"debug\"", "\"info\"", "\"warn\"", "\"error\""]
        );
    }

    #[test]
    fn test_macro_records_module_and_line() {
        let (logger, buffer) = logger();
        let line = line!() + 1;
        info!(logger, "located");

        let json: serde_json::Value = serde_json::from_str(&buffer.lines()[0]).unwrap();
        assert_eq!(json["function"], module_path!());
        assert_eq!(json["caller"], format!("{}:{}", file!(), line));
    }

    #[test]
    fn test_log_macro_fatal_does_not_exit() {
        let (logger, buffer) = logger();
        log!(logger, LogLevel::Fatal, "survives");
        assert_eq!(buffer.lines().len(), 1);
    }
}
