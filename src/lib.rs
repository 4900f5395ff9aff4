//! # Rust Log Facade
//!
//! Structured logging facade with a local sink and best-effort error reporting
//! to a remote tracker.
//!
//! ## Features
//!
//! - **Structured Events**: typed fields attached through a per-call builder
//! - **Two Formats**: colored console text or one JSON object per line
//! - **Remote Reporting**: error-level records are forwarded to a tracker on a
//!   background thread; a full queue drops events instead of blocking callers
//! - **Adapters**: line- and printf-style sinks for third-party components
//!
//! ```
//! use rust_log_facade::prelude::*;
//!
//! let logger = Logger::builder().level("info").build().unwrap();
//! logger.info().str("listener", "0.0.0.0:8080").msg("server started");
//! ```

pub mod adapters;
pub mod config;
pub mod core;
pub mod macros;
pub mod remote;

pub mod prelude {
    pub use crate::config::{Config, RemoteConfig, ServiceInfo};
    pub use crate::core::{
        Event, FieldValue, Fields, LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
        OutputFormat, Result,
    };
}

pub use crate::adapters::{LineAdapter, PrintfAdapter};
pub use crate::config::{stage_from_env, CallerConfig, Config, RemoteConfig, ServiceInfo};
pub use crate::core::{
    global, set_global, BasicSampler, BufferWriter, Caller, ErrorValue, Event, FieldValue, Fields,
    Hook, LogLevel, LogRecord, Logger, LoggerBuilder, LoggerError, LoggerMetrics, MultiWriter,
    OutputFormat, RateSampler, Result, Sampler, SamplerMetrics, StackFrame,
};
#[cfg(feature = "remote")]
pub use crate::remote::HttpTransport;
pub use crate::remote::{
    ChannelState, Dsn, MemoryClient, OverflowCallback, RemoteClient, RemoteEvent, Severity,
    DEFAULT_SHUTDOWN_TIMEOUT, REMOTE_THRESHOLD,
};
