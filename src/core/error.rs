//! Error types for the logging facade

use std::time::Duration;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Level string that does not name a known level
    #[error("Invalid log level: '{value}'")]
    InvalidLevel { value: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Remote client could not be constructed
    #[error("Remote reporting init failed: {message}")]
    RemoteInit { message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML configuration error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Serialized record could not be turned back into a record
    #[error("Failed to decode log record: {message}")]
    Decode { message: String },

    /// Remote delivery exceeded the flush timeout
    #[error("Remote delivery timed out after {timeout:?}")]
    DeliveryTimeout { timeout: Duration },

    /// Remote delivery failed for another reason
    #[error("Remote delivery failed: {message}")]
    Delivery { message: String },

    /// Delivery channel already closed
    #[error("Delivery channel closed")]
    ChannelClosed,
}

impl LoggerError {
    /// Create an invalid level error
    pub fn invalid_level(value: impl Into<String>) -> Self {
        LoggerError::InvalidLevel {
            value: value.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a remote init error
    pub fn remote_init(message: impl Into<String>) -> Self {
        LoggerError::RemoteInit {
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        LoggerError::Decode {
            message: message.into(),
        }
    }

    pub fn delivery(message: impl Into<String>) -> Self {
        LoggerError::Delivery {
            message: message.into(),
        }
    }

    /// True for errors that must stop startup
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidLevel { .. }
                | LoggerError::InvalidConfiguration { .. }
                | LoggerError::RemoteInit { .. }
                | LoggerError::YamlError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::invalid_level("fart");
        assert!(matches!(err, LoggerError::InvalidLevel { .. }));

        let err = LoggerError::config("format", "unknown format 'xml'");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::remote_init("missing project id");
        assert!(matches!(err, LoggerError::RemoteInit { .. }));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LoggerError::invalid_level("fart").to_string(),
            "Invalid log level: 'fart'"
        );
        assert_eq!(
            LoggerError::config("format", "unknown format 'xml'").to_string(),
            "Invalid configuration for format: unknown format 'xml'"
        );
        assert_eq!(
            LoggerError::DeliveryTimeout {
                timeout: Duration::from_secs(1)
            }
            .to_string(),
            "Remote delivery timed out after 1s"
        );
    }

    #[test]
    fn test_config_error_classification() {
        assert!(LoggerError::invalid_level("x").is_config_error());
        assert!(LoggerError::remote_init("x").is_config_error());
        assert!(!LoggerError::decode("x").is_config_error());
        assert!(!LoggerError::ChannelClosed.is_config_error());
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = LoggerError::io_operation("writing record", "primary sink rejected write", io_err);

        assert!(err.to_string().contains("writing record"));
        assert!(err.to_string().contains("primary sink rejected write"));
    }
}
