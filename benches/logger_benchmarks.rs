//! Criterion benchmarks for rust_log_facade

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_log_facade::core::{decode_json, encode_json, RecordEncoder};
use rust_log_facade::prelude::*;
use rust_log_facade::{Caller, ErrorValue, LogRecord, RemoteClient, RemoteEvent};
use std::sync::Arc;

fn sample_record() -> LogRecord {
    LogRecord::new(LogLevel::Error, "payment declined")
        .with_caller(Caller::new("src/billing/charge.rs", 214).with_function("billing::charge"))
        .with_fields(
            Fields::new()
                .with_field("customer", "cus_8812")
                .with_field("amount", 4999)
                .with_field("retry", true),
        )
        .with_error(ErrorValue::new("card_declined"))
}

fn sink_logger(level: &str, format: &str) -> Logger {
    Logger::builder()
        .level(level)
        .format(format)
        .color(false)
        .writer(std::io::sink())
        .build()
        .expect("Failed to build logger")
}

// ============================================================================
// Encoder Benchmarks
// ============================================================================

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");
    group.throughput(Throughput::Elements(1));

    let record = sample_record();
    let text = RecordEncoder::default();
    let colored = RecordEncoder {
        color: true,
        ..RecordEncoder::default()
    };

    group.bench_function("text", |b| {
        b.iter(|| black_box(text.encode(black_box(&record))));
    });

    group.bench_function("text_colored", |b| {
        b.iter(|| black_box(colored.encode(black_box(&record))));
    });

    group.bench_function("json", |b| {
        b.iter(|| black_box(encode_json(black_box(&record), true)));
    });

    let payload = encode_json(&record, true).expect("encode");
    group.bench_function("json_decode", |b| {
        b.iter(|| black_box(decode_json(black_box(&payload))));
    });

    group.bench_function("remote_transform", |b| {
        b.iter(|| black_box(RemoteEvent::from_record(black_box(&record))));
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let text = sink_logger("debug", "text");
    let json = sink_logger("debug", "json");

    group.bench_function("text_info_with_fields", |b| {
        b.iter(|| {
            text.info()
                .str("path", black_box("/api/orders"))
                .int("status", 200)
                .msg("request served");
        });
    });

    group.bench_function("json_info_with_fields", |b| {
        b.iter(|| {
            json.info()
                .str("path", black_box("/api/orders"))
                .int("status", 200)
                .msg("request served");
        });
    });

    let child = json.with_str("request_id", "r-1").with_str("tenant", "acme");
    group.bench_function("json_child_logger", |b| {
        b.iter(|| child.info().msg(black_box("with context")));
    });

    group.finish();
}

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = sink_logger("error", "json");

    group.bench_function("disabled_debug", |b| {
        b.iter(|| {
            logger
                .debug()
                .str("ignored", "value")
                .msgf(format_args!("never formatted {}", black_box(42)));
        });
    });

    group.finish();
}

// ============================================================================
// Remote Pipeline Benchmarks
// ============================================================================

struct DiscardClient;

impl RemoteClient for DiscardClient {
    fn capture(&mut self, event: &RemoteEvent) -> rust_log_facade::Result<()> {
        black_box(event);
        Ok(())
    }

    fn name(&self) -> &str {
        "discard"
    }
}

fn bench_remote(c: &mut Criterion) {
    let mut group = c.benchmark_group("remote");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder()
        .writer(std::io::sink())
        .remote_client(Box::new(DiscardClient))
        .build()
        .expect("Failed to build logger");
    let cause = std::io::Error::new(std::io::ErrorKind::Other, "boom");

    group.bench_function("error_with_remote", |b| {
        b.iter(|| logger.error().err(&cause).msg(black_box("reported")));
    });

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");
    group.throughput(Throughput::Elements(400));

    let logger = Arc::new(sink_logger("info", "json"));

    group.bench_function("4_threads_100_each", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let logger = Arc::clone(&logger);
                    std::thread::spawn(move || {
                        for i in 0..100 {
                            logger.info().int("thread", t).int("seq", i).msg("concurrent");
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().expect("thread panicked");
            }
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_encoding,
    bench_logging,
    bench_level_filtering,
    bench_remote,
    bench_concurrent_logging
);

criterion_main!(benches);
