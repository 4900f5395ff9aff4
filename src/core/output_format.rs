//! Record encoding for the primary sink
//!
//! Provides the two output formats:
//! - Text: human-readable console line with optional ANSI colors
//! - Json: one JSON object per line, also the wire form of the delivery channel

use super::error::{LoggerError, Result};
use super::fields::{FieldValue, Fields};
use super::log_entry::{Caller, ErrorValue, LogRecord};
use super::log_level::LogLevel;
use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;
use serde::ser::{SerializeMap, Serializer};
use std::borrow::Cow;
use std::str::FromStr;

pub const LEVEL_KEY: &str = "level";
pub const TIME_KEY: &str = "time";
pub const MESSAGE_KEY: &str = "message";
pub const CALLER_KEY: &str = "caller";
pub const FUNCTION_KEY: &str = "function";
pub const ERROR_KEY: &str = "error";

/// Prepended to user field keys that would shadow a reserved key
pub const FIELD_KEY_PREFIX: &str = "fields.";

const RESERVED_KEYS: [&str; 6] = [
    LEVEL_KEY,
    TIME_KEY,
    MESSAGE_KEY,
    CALLER_KEY,
    FUNCTION_KEY,
    ERROR_KEY,
];

/// JSON key for a user field.
///
/// Reserved keys and keys already carrying [`FIELD_KEY_PREFIX`] get the
/// prefix, so [`field_key_from_json`] can always undo it.
pub fn field_key_to_json(key: &str) -> Cow<'_, str> {
    if RESERVED_KEYS.contains(&key) || key.starts_with(FIELD_KEY_PREFIX) {
        Cow::Owned(format!("{}{}", FIELD_KEY_PREFIX, key))
    } else {
        Cow::Borrowed(key)
    }
}

pub fn field_key_from_json(key: &str) -> &str {
    key.strip_prefix(FIELD_KEY_PREFIX).unwrap_or(key)
}

/// Output format for log records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    ///
    /// Example: `2025-01-08T10:30:45.123456789Z INF |> Request processed <| main.rs:12 > status=200`
    #[default]
    Text,

    /// JSON format for machine processing
    ///
    /// Example: `{"level":"info","time":"2025-01-08T10:30:45.123456789Z","message":"Request processed","status":200}`
    Json,
}

impl FromStr for OutputFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "text" | "console" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(LoggerError::config(
                "format",
                format!("unknown format '{}', expected 'text' or 'json'", other),
            )),
        }
    }
}

/// Encoder settings applied to every record a logger writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordEncoder {
    pub format: OutputFormat,
    pub color: bool,
    pub caller: bool,
}

impl Default for RecordEncoder {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: false,
            caller: true,
        }
    }
}

impl RecordEncoder {
    /// Encode one record as a newline-terminated line
    pub fn encode(&self, record: &LogRecord) -> Result<Vec<u8>> {
        let mut out = match self.format {
            OutputFormat::Text => self.format_text(record).into_bytes(),
            OutputFormat::Json => encode_json(record, self.caller)?,
        };
        out.push(b'\n');
        Ok(out)
    }

    fn format_text(&self, record: &LogRecord) -> String {
        let mut line = String::with_capacity(128);

        line.push_str(&format_time(&record.timestamp));
        line.push(' ');
        line.push_str(&self.paint_level(record.level));
        line.push_str(" |> ");
        line.push_str(&record.message);
        line.push_str(" <|");

        if self.caller {
            if let Some(ref caller) = record.caller {
                let caller = caller.to_string();
                line.push(' ');
                if self.color {
                    line.push_str(&caller.bold().to_string());
                } else {
                    line.push_str(&caller);
                }
                line.push_str(" >");
            }
        }

        for (key, value) in record.fields.iter() {
            line.push(' ');
            line.push_str(&self.paint_key(key, false));
            line.push('=');
            line.push_str(&text_value(value));
        }

        if let Some(ref error) = record.error {
            line.push(' ');
            line.push_str(&self.paint_key(ERROR_KEY, true));
            line.push('=');
            line.push_str(&quote_if_needed(&error.message));
        }

        line
    }

    fn paint_level(&self, level: LogLevel) -> String {
        if self.color {
            level.marker().color(level.color_code()).bold().to_string()
        } else {
            level.marker().to_string()
        }
    }

    fn paint_key(&self, key: &str, is_error: bool) -> String {
        match (self.color, is_error) {
            (false, _) => key.to_string(),
            (true, false) => key.cyan().to_string(),
            (true, true) => key.red().to_string(),
        }
    }
}

pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn text_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Str(s) => quote_if_needed(s),
        other => other.to_string(),
    }
}

fn quote_if_needed(s: &str) -> String {
    let needs_quotes =
        s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '"' || c == '=');
    if needs_quotes {
        serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
    } else {
        s.to_string()
    }
}

/// Encode a record as a single JSON object (no trailing newline).
///
/// Key order: level, time, message, caller, function, fields, error. A record
/// without a level omits the `level` key. User fields never shadow the
/// reserved keys, see [`field_key_to_json`].
pub fn encode_json(record: &LogRecord, with_caller: bool) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(256);
    {
        let mut ser = serde_json::Serializer::new(&mut out);
        let mut map = ser.serialize_map(None)?;

        if record.level != LogLevel::NoLevel {
            map.serialize_entry(LEVEL_KEY, record.level.to_str())?;
        }
        map.serialize_entry(TIME_KEY, &format_time(&record.timestamp))?;
        map.serialize_entry(MESSAGE_KEY, &record.message)?;

        if with_caller {
            if let Some(ref caller) = record.caller {
                map.serialize_entry(CALLER_KEY, &caller.to_string())?;
                if let Some(ref function) = caller.function {
                    map.serialize_entry(FUNCTION_KEY, function)?;
                }
            }
        }

        for (key, value) in record.fields.iter() {
            map.serialize_entry(&field_key_to_json(key), &value.to_json_value())?;
        }

        if let Some(ref error) = record.error {
            map.serialize_entry(ERROR_KEY, error)?;
        }

        map.end()?;
    }
    Ok(out)
}

/// Decode a record written by [`encode_json`].
///
/// Keys other than the reserved ones become fields; their order follows the
/// decoder's map, not the insertion order.
pub fn decode_json(bytes: &[u8]) -> Result<LogRecord> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| LoggerError::decode(e.to_string()))?;
    let serde_json::Value::Object(object) = value else {
        return Err(LoggerError::decode("record is not a JSON object"));
    };

    let mut level = None;
    let mut timestamp = None;
    let mut message = String::new();
    let mut caller: Option<Caller> = None;
    let mut function = None;
    let mut error = None;
    let mut fields = Fields::new();

    for (key, value) in object {
        match key.as_str() {
            LEVEL_KEY => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| LoggerError::decode("level is not a string"))?;
                level = Some(
                    raw.parse::<LogLevel>()
                        .map_err(|e| LoggerError::decode(e.to_string()))?,
                );
            }
            TIME_KEY => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| LoggerError::decode("time is not a string"))?;
                let parsed = DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| LoggerError::decode(format!("bad time '{}': {}", raw, e)))?;
                timestamp = Some(parsed.with_timezone(&Utc));
            }
            MESSAGE_KEY => {
                message = value.as_str().unwrap_or_default().to_string();
            }
            CALLER_KEY => {
                caller = value.as_str().and_then(Caller::parse);
            }
            FUNCTION_KEY => {
                function = value.as_str().map(str::to_string);
            }
            ERROR_KEY => {
                error = Some(match value {
                    serde_json::Value::String(s) => ErrorValue::new(s),
                    other => serde_json::from_value::<ErrorValue>(other)
                        .map_err(|e| LoggerError::decode(format!("bad error field: {}", e)))?,
                });
            }
            _ => fields.push(field_key_from_json(&key), FieldValue::from_json_value(value)),
        }
    }

    let level = level.unwrap_or(LogLevel::NoLevel);
    if let (Some(caller), Some(function)) = (caller.as_mut(), function) {
        caller.function = Some(function);
    }

    Ok(LogRecord {
        level,
        message,
        fields,
        error,
        timestamp: timestamp.unwrap_or_else(Utc::now),
        caller,
    })
}
