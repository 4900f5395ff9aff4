//! Core logger types: records, fields, encoding, sinks and the facade

pub mod call_site;
pub mod error;
pub mod event;
pub mod fields;
pub mod hook;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod sampling;
pub mod sink;

pub use error::{LoggerError, Result};
pub use event::Event;
pub use fields::{FieldValue, Fields};
pub use hook::Hook;
pub use log_entry::{Caller, ErrorValue, LogRecord, StackFrame};
pub use log_level::LogLevel;
pub use logger::{global, set_global, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use output_format::{decode_json, encode_json, OutputFormat, RecordEncoder};
pub use sampling::{BasicSampler, RateSampler, Sampler, SamplerMetrics};
pub use sink::{BoxedWriter, BufferWriter, MultiWriter, Sink};
