//! Remote reporting tests
//!
//! These tests verify:
//! - Error-level records reach the remote client exactly once
//! - Records below the threshold never leave the process
//! - A saturated queue drops events instead of blocking the caller
//! - An unreachable tracker never surfaces as an error to the log call
//! - The HTTP transport speaks the store endpoint protocol (against a mockito server)

use rust_log_facade::prelude::*;
use rust_log_facade::{BufferWriter, ChannelState, MemoryClient, Severity};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn remote_logger(client: &MemoryClient) -> (Logger, BufferWriter) {
    let buffer = BufferWriter::new();
    let logger = Logger::builder()
        .level("trace")
        .color(false)
        .service(ServiceInfo::new("staging", "checkout", "3.2.0"))
        .writer(buffer.clone())
        .remote_client(Box::new(client.clone()))
        .build()
        .expect("Failed to build logger");
    (logger, buffer)
}

fn wait_for(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn test_error_with_attached_error_delivers_one_event() {
    let client = MemoryClient::new();
    let (logger, buffer) = remote_logger(&client);
    let cause = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "upstream reset");

    logger
        .error()
        .err(&cause)
        .str("cart", "c-991")
        .msg("checkout failed");

    assert!(wait_for(Duration::from_secs(1), || client.len() == 1));
    assert!(logger.shutdown(Duration::from_secs(5)));

    let events = client.events();
    assert_eq!(events.len(), 1);

    let event = &events[0];
    assert_eq!(event.message, "checkout failed");
    assert_eq!(event.level, Severity::Error);
    assert_eq!(event.environment.as_deref(), Some("staging"));
    assert_eq!(event.release.as_deref(), Some("checkout@3.2.0"));
    assert_eq!(event.extra["cart"], "c-991");

    let exception = event.first_exception().expect("exception block");
    assert_eq!(exception.ty, "checkout failed");
    assert!(!exception.value.is_empty());
    assert!(exception.value.starts_with(file!()));
    assert_eq!(exception.stacktrace.frames.len(), 1);

    assert_eq!(buffer.lines().len(), 1);
}

#[test]
fn test_levels_below_threshold_stay_local() {
    let client = MemoryClient::new();
    let (logger, buffer) = remote_logger(&client);

    for level in [LogLevel::Trace, LogLevel::Debug, LogLevel::Info, LogLevel::Warn] {
        logger
            .with_level(level)
            .err(&std::fmt::Error)
            .msg("not for the tracker");
    }

    assert!(logger.shutdown(Duration::from_secs(5)));
    assert!(client.is_empty());
    assert_eq!(buffer.lines().len(), 4);
    assert_eq!(logger.metrics().remote_enqueued(), 0);
}

#[test]
fn test_high_severity_without_error_has_no_exception() {
    let client = MemoryClient::new();
    let (logger, _buffer) = remote_logger(&client);

    logger.with_level(LogLevel::Fatal).str("signal", "SIGTERM").msg("stopping");

    assert!(logger.shutdown(Duration::from_secs(5)));
    let events = client.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, Severity::Fatal);
    assert!(events[0].exception.is_none());
}

#[test]
fn test_fields_named_like_record_keys_survive_delivery() {
    let client = MemoryClient::new();
    let (logger, _buffer) = remote_logger(&client);

    logger.error().str("message", "user supplied").msg("first");
    logger.error().str("level", "high").msg("second");
    logger.error().str("time", "yesterday").msg("third");

    assert!(logger.shutdown(Duration::from_secs(5)));
    assert_eq!(logger.metrics().decode_failures(), 0);

    let events = client.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].message, "first");
    assert_eq!(events[0].extra["message"], "user supplied");
    assert_eq!(events[1].message, "second");
    assert_eq!(events[1].level, Severity::Error);
    assert_eq!(events[1].extra["level"], "high");
    assert_eq!(events[2].message, "third");
    assert_eq!(events[2].extra["time"], "yesterday");
}

#[test]
fn test_full_queue_drops_instead_of_blocking() {
    let client = MemoryClient::new().with_delay(Duration::from_millis(100));
    let alerts = Arc::new(AtomicU64::new(0));
    let seen = Arc::clone(&alerts);

    let logger = Logger::builder()
        .writer(BufferWriter::new())
        .remote(RemoteConfig {
            buffer_size: 2,
            ..RemoteConfig::new("https://key@errors.invalid/1")
        })
        .remote_client(Box::new(client.clone()))
        .on_overflow(Arc::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }))
        .build()
        .expect("Failed to build logger");

    let start = Instant::now();
    for i in 0..50 {
        logger.error().int("seq", i).msg("burst");
    }
    let elapsed = start.elapsed();

    // 50 deliveries at 100ms each would take 5s if the caller blocked
    assert!(elapsed < Duration::from_secs(2), "caller blocked for {:?}", elapsed);

    let metrics = logger.metrics();
    assert!(metrics.remote_dropped() > 0);
    assert_eq!(metrics.remote_enqueued() + metrics.remote_dropped(), 50);
    assert!(alerts.load(Ordering::SeqCst) >= 1);
    assert_eq!(metrics.records_written(), 50);

    assert!(logger.shutdown(Duration::from_secs(5)));
    assert_eq!(client.len() as u64, logger.metrics().remote_enqueued());
}

#[test]
fn test_shutdown_closes_pipeline_for_all_clones() {
    let client = MemoryClient::new();
    let (logger, _buffer) = remote_logger(&client);
    let clone = logger.with_str("component", "worker");

    assert_eq!(clone.remote_state(), Some(ChannelState::Running));
    assert!(logger.shutdown(Duration::from_secs(5)));
    assert_eq!(clone.remote_state(), Some(ChannelState::Closed));

    clone.error().msg("after close");
    assert!(client.is_empty());
}

#[cfg(feature = "remote")]
#[test]
fn test_unreachable_tracker_never_errors_caller() {
    let buffer = BufferWriter::new();
    let config = Config::default().with_remote(RemoteConfig {
        flush_timeout_ms: 500,
        ..RemoteConfig::new("http://key@127.0.0.1:1/1")
    });
    let logger = Logger::init(&config, ServiceInfo::default(), Some(Box::new(buffer.clone())))
        .expect("Failed to init logger");

    let cause = std::io::Error::new(std::io::ErrorKind::Other, "boom");
    let result = logger.error().err(&cause).try_msg("nobody listening");
    assert!(result.is_ok());

    assert!(logger.shutdown(Duration::from_secs(5)));
    let metrics = logger.metrics();
    assert_eq!(metrics.remote_delivered(), 0);
    assert_eq!(metrics.remote_failed() + metrics.remote_timeouts(), 1);
    assert_eq!(buffer.lines().len(), 1);
}

#[cfg(feature = "remote")]
#[test]
fn test_http_transport_posts_event() {
    use mockito::Matcher;
    use serde_json::json;

    let mut server = mockito::Server::new();
    let store = server
        .mock("POST", "/api/42/store/")
        .match_header(
            "x-sentry-auth",
            Matcher::Regex(r"^Sentry sentry_version=7, .*sentry_key=publickey".to_string()),
        )
        .match_header("content-type", "application/json")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "message": "reconciliation failed",
                "level": "error",
                "platform": "other",
                "environment": "production",
                "release": "ledger@9.1.0",
                "tags": { "service": "ledger" },
                "extra": { "account": "acc-1" },
            })),
            Matcher::Regex(r#""event_id":"[0-9a-f]{32}""#.to_string()),
            Matcher::Regex(r#""type":"reconciliation failed""#.to_string()),
        ]))
        .with_status(200)
        .expect(1)
        .create();

    let config = Config::default().with_remote(RemoteConfig {
        flush_timeout_ms: 2000,
        ..RemoteConfig::new(format!("http://publickey@{}/42", server.host_with_port()))
    });
    let logger = Logger::init(
        &config,
        ServiceInfo::new("production", "ledger", "9.1.0"),
        Some(Box::new(BufferWriter::new())),
    )
    .expect("Failed to init logger");

    let cause = std::io::Error::new(std::io::ErrorKind::Other, "balance mismatch");
    logger
        .error()
        .err(&cause)
        .str("account", "acc-1")
        .msg("reconciliation failed");

    assert!(logger.shutdown(Duration::from_secs(5)));
    store.assert();
    assert_eq!(logger.metrics().remote_delivered(), 1);
}

#[cfg(feature = "remote")]
#[test]
fn test_http_transport_counts_rejected_event_as_failure() {
    let mut server = mockito::Server::new();
    let store = server
        .mock("POST", "/api/7/store/")
        .with_status(500)
        .expect(1)
        .create();

    let config = Config::default().with_remote(RemoteConfig::new(format!(
        "http://key@{}/7",
        server.host_with_port()
    )));
    let logger = Logger::init(&config, ServiceInfo::default(), Some(Box::new(BufferWriter::new())))
        .expect("Failed to init logger");

    let result = logger.error().try_msg("tracker is down");
    assert!(result.is_ok());

    assert!(logger.shutdown(Duration::from_secs(5)));
    store.assert();
    assert_eq!(logger.metrics().remote_delivered(), 0);
    assert_eq!(logger.metrics().remote_failed(), 1);
}
