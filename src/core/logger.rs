//! Logger facade
//!
//! A [`Logger`] owns the record encoder and the primary sink and, when remote
//! reporting is configured, the delivery channel plus its dispatcher thread.
//! Clones share the remote pipeline; derived loggers (`level`, `with_field`,
//! `output`) share it too.

use super::call_site;
use super::error::Result;
use super::event::{Event, Terminate};
use super::fields::{FieldValue, Fields};
use super::hook::Hook;
use super::log_entry::{Caller, ErrorValue, LogRecord};
use super::log_level::LogLevel;
use super::metrics::LoggerMetrics;
use super::output_format::{encode_json, RecordEncoder};
use super::sampling::Sampler;
use super::sink::{BoxedWriter, Sink};
use crate::config::{Config, RemoteConfig, ServiceInfo};
use crate::remote::{
    qualifies, ChannelState, OfferOutcome, OverflowCallback, RemoteClient, RemotePipeline,
};
use parking_lot::RwLock;
use std::fmt;
use std::io::Write;
use std::panic::Location;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

struct Shared {
    remote: Option<RemotePipeline>,
    metrics: Arc<LoggerMetrics>,
    service: ServiceInfo,
    flush_timeout: Duration,
}

/// Structured logger
///
/// # Example
///
/// ```
/// use rust_log_facade::{Config, Logger, ServiceInfo};
///
/// let config = Config::default().with_level("info").with_color(false);
/// let logger = Logger::init(&config, ServiceInfo::new("dev", "billing", "1.0.0"), None).unwrap();
///
/// logger.info().str("order", "A-17").int("items", 3).msg("order placed");
/// logger.debug().msg("filtered out");
/// ```
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    sink: Sink,
    encoder: RecordEncoder,
    min_level: LogLevel,
    context: Fields,
    sampler: Option<Arc<dyn Sampler>>,
    hooks: Vec<Arc<dyn Hook>>,
    /// Frames to walk past the `#[track_caller]` location
    caller_skip: usize,
}

impl Logger {
    /// Build a logger from configuration.
    ///
    /// Fails on an unknown level or format, and when remote reporting is
    /// enabled with a DSN but the client cannot be constructed. Without a
    /// writer the logger writes to stdout.
    pub fn init(config: &Config, service: ServiceInfo, writer: Option<BoxedWriter>) -> Result<Self> {
        let mut builder = LoggerBuilder::new().config(config.clone()).service(service);
        if let Some(writer) = writer {
            builder = builder.boxed_writer(writer);
        }
        builder.build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Level check plus the sampler's verdict. Consumes one sampling
    /// decision, so call it once per record.
    fn should_log(&self, level: LogLevel) -> bool {
        self.is_enabled(level) && self.sampler.as_ref().map_or(true, |s| s.sample(level))
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn encoder(&self) -> &RecordEncoder {
        &self.encoder
    }

    pub fn service(&self) -> &ServiceInfo {
        &self.shared.service
    }

    pub(crate) fn flush_timeout(&self) -> Duration {
        self.shared.flush_timeout
    }

    /// Counters shared with the remote dispatcher
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    /// `None` when remote reporting is off
    pub fn remote_state(&self) -> Option<ChannelState> {
        self.shared.remote.as_ref().map(RemotePipeline::state)
    }

    pub(crate) fn hooks(&self) -> &[Arc<dyn Hook>] {
        &self.hooks
    }

    #[track_caller]
    fn event(&self, level: LogLevel, terminate: Terminate) -> Event<'_> {
        let location = Location::caller();
        let record = self.should_log(level).then(|| {
            let caller = match self.caller_skip {
                0 => Caller::from_location(location),
                extra => call_site::resolve(location, extra),
            };
            LogRecord::new(level, "")
                .with_caller(caller)
                .with_fields(self.context.clone())
        });
        Event::new(self, record, terminate)
    }

    #[track_caller]
    pub fn trace(&self) -> Event<'_> {
        self.event(LogLevel::Trace, Terminate::No)
    }

    #[track_caller]
    pub fn debug(&self) -> Event<'_> {
        self.event(LogLevel::Debug, Terminate::No)
    }

    #[track_caller]
    pub fn info(&self) -> Event<'_> {
        self.event(LogLevel::Info, Terminate::No)
    }

    #[track_caller]
    pub fn warn(&self) -> Event<'_> {
        self.event(LogLevel::Warn, Terminate::No)
    }

    #[track_caller]
    pub fn error(&self) -> Event<'_> {
        self.event(LogLevel::Error, Terminate::No)
    }

    /// Emits, shuts the remote pipeline down (bounded by the flush timeout)
    /// and exits the process with status 1.
    #[track_caller]
    pub fn fatal(&self) -> Event<'_> {
        self.event(LogLevel::Fatal, Terminate::Exit)
    }

    /// Emits and then panics with the message.
    #[track_caller]
    pub fn panic(&self) -> Event<'_> {
        self.event(LogLevel::Panic, Terminate::Panic)
    }

    /// Error-level event carrying `err`, or an info-level event when there is none
    #[track_caller]
    pub fn err(&self, err: Option<&dyn std::error::Error>) -> Event<'_> {
        match err {
            Some(err) => self
                .event(LogLevel::Error, Terminate::No)
                .error_value(ErrorValue::new(err.to_string())),
            None => self.event(LogLevel::Info, Terminate::No),
        }
    }

    /// Event at any level; never exits or panics, even for fatal and panic
    #[track_caller]
    pub fn with_level(&self, level: LogLevel) -> Event<'_> {
        self.event(level, Terminate::No)
    }

    /// Event without a level. It passes every minimum level and stays local.
    #[track_caller]
    pub fn log(&self) -> Event<'_> {
        self.event(LogLevel::NoLevel, Terminate::No)
    }

    /// Debug-level message without fields
    #[track_caller]
    pub fn print(&self, message: impl AsRef<str>) {
        self.event(LogLevel::Debug, Terminate::No).msg(message);
    }

    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.event(LogLevel::Debug, Terminate::No).msgf(args);
    }

    /// Derived logger with another minimum level
    #[must_use]
    pub fn level(&self, level: LogLevel) -> Self {
        let mut derived = self.clone();
        derived.min_level = level;
        derived
    }

    /// Like [`level`](Self::level); an unknown string keeps the current level
    #[must_use]
    pub fn level_str(&self, level: &str) -> Self {
        match LogLevel::from_config(level) {
            Ok(level) => self.level(level),
            Err(e) => {
                eprintln!("[LOGGER WARNING] {}; keeping {}", e, self.min_level);
                self.clone()
            }
        }
    }

    /// Derived logger that writes only the records `sampler` lets through
    #[must_use]
    pub fn sample(&self, sampler: impl Sampler + 'static) -> Self {
        let mut derived = self.clone();
        derived.sampler = Some(Arc::new(sampler));
        derived
    }

    /// Derived logger running `hook` on every record after the existing hooks
    #[must_use]
    pub fn hook(&self, hook: impl Hook + 'static) -> Self {
        let mut derived = self.clone();
        derived.hooks.push(Arc::new(hook));
        derived
    }

    /// Derived logger whose records all carry this field first
    #[must_use]
    pub fn with_field(&self, key: &str, value: impl Into<FieldValue>) -> Self {
        let mut derived = self.clone();
        derived.context.push(key, value);
        derived
    }

    #[must_use]
    pub fn with_str(&self, key: &str, value: impl Into<String>) -> Self {
        self.with_field(key, FieldValue::Str(value.into()))
    }

    /// Derived logger writing to another sink
    #[must_use]
    pub fn output<W: Write + Send + 'static>(&self, writer: W) -> Self {
        let mut derived = self.clone();
        derived.sink = Sink::new(writer);
        derived
    }

    /// Write a finished record to the primary sink and, when it qualifies,
    /// offer it to the remote pipeline.
    ///
    /// Only the primary sink's outcome is returned. Remote problems are
    /// counted and reported on stderr.
    pub(crate) fn emit(&self, record: &LogRecord) -> Result<()> {
        let metrics = &self.shared.metrics;

        let result = self
            .encoder
            .encode(record)
            .and_then(|bytes| self.sink.write_record(&bytes));
        if result.is_ok() {
            metrics.record_written();
        } else {
            metrics.record_write_failure();
        }

        if let Some(ref remote) = self.shared.remote {
            if qualifies(record.level) {
                match encode_json(record, true) {
                    Ok(payload) => {
                        if remote.offer(payload) == OfferOutcome::Closed {
                            metrics.record_remote_dropped();
                        }
                    }
                    Err(e) => eprintln!("[LOGGER ERROR] Failed to serialize remote record: {}", e),
                }
            }
        }

        result
    }

    pub fn flush(&self) -> Result<()> {
        self.sink.flush()
    }

    /// Close the remote pipeline and wait up to `timeout` for it to drain.
    ///
    /// Affects every clone of this logger. Returns `true` when there was no
    /// pipeline or it drained in time.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
        match self.shared.remote {
            Some(ref remote) => remote.shutdown(timeout),
            None => true,
        }
    }
}

impl Default for Logger {
    /// Debug-level text logger on stdout, no remote reporting
    fn default() -> Self {
        Self::from_parts(
            RecordEncoder::default(),
            Sink::stdout(),
            LogLevel::Debug,
            None,
            Arc::new(LoggerMetrics::new()),
            ServiceInfo::default(),
            RemoteConfig::default().flush_timeout(),
        )
    }
}

impl Logger {
    fn from_parts(
        encoder: RecordEncoder,
        sink: Sink,
        min_level: LogLevel,
        remote: Option<RemotePipeline>,
        metrics: Arc<LoggerMetrics>,
        service: ServiceInfo,
        flush_timeout: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                remote,
                metrics,
                service,
                flush_timeout,
            }),
            sink,
            encoder,
            min_level,
            context: Fields::new(),
            sampler: None,
            hooks: Vec::new(),
            caller_skip: 0,
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .field("encoder", &self.encoder)
            .field("context", &self.context)
            .field("sampled", &self.sampler.is_some())
            .field("hooks", &self.hooks.len())
            .field("remote", &self.remote_state())
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
///
/// ```
/// use rust_log_facade::{Logger, MemoryClient};
///
/// let client = MemoryClient::new();
/// let logger = Logger::builder()
///     .level("warn")
///     .format("json")
///     .remote_client(Box::new(client.clone()))
///     .build()
///     .unwrap();
///
/// logger.error().msg("reported");
/// assert!(logger.shutdown(std::time::Duration::from_secs(5)));
/// assert_eq!(client.len(), 1);
/// ```
#[derive(Default)]
pub struct LoggerBuilder {
    config: Config,
    service: ServiceInfo,
    writer: Option<BoxedWriter>,
    remote_client: Option<Box<dyn RemoteClient>>,
    on_overflow: Option<OverflowCallback>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn level(mut self, level: &str) -> Self {
        self.config.level = level.to_string();
        self
    }

    #[must_use]
    pub fn format(mut self, format: &str) -> Self {
        self.config.format = format.to_string();
        self
    }

    #[must_use]
    pub fn color(mut self, color: bool) -> Self {
        self.config.color = color;
        self
    }

    #[must_use]
    pub fn hide_caller(mut self, hide: bool) -> Self {
        self.config.caller.disabled = hide;
        self
    }

    /// Frames between the logging call and the reported call site. The
    /// default of 2 reports the direct caller; 3 reports its caller, which
    /// suits loggers wrapped in a helper function.
    #[must_use]
    pub fn caller_skip_frames(mut self, frames: usize) -> Self {
        self.config.caller.skip_frames = frames;
        self
    }

    #[must_use]
    pub fn service(mut self, service: ServiceInfo) -> Self {
        self.service = service;
        self
    }

    #[must_use]
    pub fn writer<W: Write + Send + 'static>(self, writer: W) -> Self {
        self.boxed_writer(Box::new(writer))
    }

    #[must_use]
    pub fn boxed_writer(mut self, writer: BoxedWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    #[must_use]
    pub fn remote(mut self, remote: RemoteConfig) -> Self {
        self.config.remote = Some(remote);
        self
    }

    /// Use this client instead of the HTTP transport. Starts the remote
    /// pipeline even without a remote section in the config.
    #[must_use]
    pub fn remote_client(mut self, client: Box<dyn RemoteClient>) -> Self {
        self.remote_client = Some(client);
        self
    }

    /// Called when the remote queue overflows (first drop, then every 1000th)
    #[must_use]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    pub fn build(self) -> Result<Logger> {
        let LoggerBuilder {
            config,
            service,
            writer,
            remote_client,
            on_overflow,
        } = self;

        config.validate()?;
        let min_level = config.min_level()?;
        let encoder = RecordEncoder {
            format: config.output_format()?,
            color: config.color,
            caller: !config.caller.disabled,
        };
        let sink = writer.map(Sink::from_boxed).unwrap_or_else(Sink::stdout);
        let metrics = Arc::new(LoggerMetrics::new());

        let remote_config = config.active_remote().cloned();
        let client = match (remote_client, &remote_config) {
            (Some(client), _) => Some(client),
            (None, Some(remote)) => Some(http_client(remote)?),
            (None, None) => None,
        };

        let settings = remote_config.unwrap_or_default();
        let remote = match client {
            Some(client) => Some(RemotePipeline::start(
                client,
                settings.buffer_size,
                Arc::clone(&metrics),
                service.clone(),
                settings.debug,
                on_overflow,
            )?),
            None => None,
        };

        let mut logger = Logger::from_parts(
            encoder,
            sink,
            min_level,
            remote,
            metrics,
            service,
            settings.flush_timeout(),
        );
        logger.caller_skip = call_site::extra_frames(config.caller.skip_frames);
        Ok(logger)
    }
}

#[cfg(feature = "remote")]
fn http_client(remote: &RemoteConfig) -> Result<Box<dyn RemoteClient>> {
    use crate::remote::{Dsn, HttpTransport};

    let dsn: Dsn = remote.dsn.parse()?;
    Ok(Box::new(HttpTransport::new(dsn, remote.flush_timeout())?))
}

#[cfg(not(feature = "remote"))]
fn http_client(_remote: &RemoteConfig) -> Result<Box<dyn RemoteClient>> {
    Err(crate::core::error::LoggerError::remote_init(
        "remote reporting requires the `remote` feature",
    ))
}

static GLOBAL: RwLock<Option<Logger>> = RwLock::new(None);
static FALLBACK: OnceLock<Logger> = OnceLock::new();

/// Install the process-wide logger, returning the previous one
pub fn set_global(logger: Logger) -> Option<Logger> {
    GLOBAL.write().replace(logger)
}

/// The process-wide logger.
///
/// Prefer passing a [`Logger`] explicitly. Call sites that have none get the
/// installed logger, or a debug-level text logger on stdout.
pub fn global() -> Logger {
    if let Some(logger) = GLOBAL.read().as_ref() {
        return logger.clone();
    }
    FALLBACK.get_or_init(Logger::default).clone()
}
