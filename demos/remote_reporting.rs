//! Remote error reporting
//!
//! Error-level records are forwarded to a tracker on a background thread. This
//! example injects an in-memory client so it runs without a network; set
//! `LOG_DSN` to post to a real store endpoint instead.
//!
//! Run with: cargo run --example remote_reporting

use rust_log_facade::prelude::*;
use rust_log_facade::MemoryClient;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Log Facade - Remote Reporting Example ===\n");

    let service = ServiceInfo::from_env("remote-demo", "0.1.0");
    let client = MemoryClient::new();

    let logger = match std::env::var("LOG_DSN") {
        Ok(dsn) => {
            println!("Reporting to {}", dsn);
            Logger::builder()
                .service(service)
                .remote(RemoteConfig {
                    debug: true,
                    ..RemoteConfig::new(dsn)
                })
                .build()?
        }
        Err(_) => Logger::builder()
            .service(service)
            .remote_client(Box::new(client.clone()))
            .build()?,
    };

    logger.info().msg("stays local");

    let cause = std::io::Error::new(std::io::ErrorKind::TimedOut, "payment gateway timed out");
    logger
        .error()
        .err(&cause)
        .str("order", "A-17")
        .msg("checkout failed");

    if !logger.shutdown(Duration::from_secs(5)) {
        eprintln!("remote pipeline did not drain in time");
    }

    let metrics = logger.metrics();
    println!(
        "\nenqueued={} delivered={} dropped={} failed={}",
        metrics.remote_enqueued(),
        metrics.remote_delivered(),
        metrics.remote_dropped(),
        metrics.remote_failed()
    );

    for event in client.events() {
        println!(
            "captured {} [{}] release={:?}",
            event.event_id,
            event.level,
            event.release
        );
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
