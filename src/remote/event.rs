//! Remote events and the record-to-event transformation

use super::severity::Severity;
use crate::config::ServiceInfo;
use crate::core::{LogLevel, LogRecord, StackFrame};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Records at or above this level are forwarded to the remote tracker
pub const REMOTE_THRESHOLD: LogLevel = LogLevel::Error;

const PLATFORM: &str = "other";
const LOGGER_NAME: &str = "rust_log_facade";

#[inline]
pub fn qualifies(level: LogLevel) -> bool {
    level >= REMOTE_THRESHOLD && level != LogLevel::NoLevel
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stacktrace {
    pub frames: Vec<StackFrame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exception {
    #[serde(rename = "type")]
    pub ty: String,
    pub value: String,
    pub stacktrace: Stacktrace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionList {
    pub values: Vec<Exception>,
}

/// A record reshaped for the error tracker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteEvent {
    pub event_id: String,
    pub message: String,
    pub level: Severity,
    pub timestamp: DateTime<Utc>,
    pub platform: String,
    pub logger: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    pub extra: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionList>,
}

impl RemoteEvent {
    /// Build the remote form of a record.
    ///
    /// Message and timestamp are copied, the level goes through [`Severity`],
    /// the error moves into the exception block and every other field lands in
    /// `extra`. A record without an error ships without an exception block.
    pub fn from_record(record: &LogRecord) -> Self {
        let mut extra = BTreeMap::new();
        for (key, value) in record.fields.iter() {
            extra.insert(key.to_string(), value.to_json_value());
        }

        let exception = record.error.as_ref().map(|error| {
            let frames = match record.caller {
                _ if error.has_frames() => error.stacktrace.clone().unwrap_or_default(),
                Some(ref caller) => vec![StackFrame::from_caller(caller)],
                None => Vec::new(),
            };
            let value = record
                .caller
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_else(|| error.message.clone());

            ExceptionList {
                values: vec![Exception {
                    ty: record.message.clone(),
                    value,
                    stacktrace: Stacktrace { frames },
                }],
            }
        });

        Self {
            event_id: new_event_id(),
            message: record.message.clone(),
            level: Severity::from(record.level),
            timestamp: record.timestamp,
            platform: PLATFORM.to_string(),
            logger: LOGGER_NAME.to_string(),
            environment: None,
            release: None,
            tags: BTreeMap::new(),
            extra,
            exception,
        }
    }

    /// Attach stage, release and service tag
    #[must_use]
    pub fn with_service(mut self, service: &ServiceInfo) -> Self {
        if !service.stage.is_empty() {
            self.environment = Some(service.stage.clone());
        }
        self.release = service.release();
        if !service.name.is_empty() {
            self.tags.insert("service".to_string(), service.name.clone());
        }
        self
    }

    pub fn first_exception(&self) -> Option<&Exception> {
        self.exception.as_ref().and_then(|list| list.values.first())
    }
}

/// 32 lowercase hex characters
fn new_event_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}
