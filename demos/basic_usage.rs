//! Basic facade usage
//!
//! Demonstrates console and JSON output, structured fields, child loggers and
//! the formatting macros.
//!
//! Run with: cargo run --example basic_usage

use rust_log_facade::prelude::*;
use rust_log_facade::{info, warn};

fn main() -> Result<()> {
    println!("=== Rust Log Facade - Basic Usage Example ===\n");

    let config = Config::default().with_level("trace");
    let logger = Logger::init(&config, ServiceInfo::from_env("demo", "0.1.0"), None)?;

    println!("1. Logging at different levels:");
    logger.trace().msg("This is a trace message");
    logger.debug().msg("This is a debug message");
    logger.info().msg("This is an info message");
    logger.warn().msg("This is a warning message");
    logger.error().msg("This is an error message");

    println!("\n2. Structured fields:");
    logger
        .info()
        .str("user", "Ada Lovelace")
        .int("attempt", 3)
        .bool("admin", false)
        .strs("roles", &["reader", "editor"])
        .msg("login accepted");

    println!("\n3. Child logger with request context:");
    let request = logger.with_str("request_id", "req-7731");
    request.info().int("status", 200).msg("handled");
    info!(request, "served {} bytes", 5120);

    println!("\n4. Minimum level raised to WARN:");
    let quiet = logger.level(LogLevel::Warn);
    quiet.info().msg("Info message (hidden)");
    warn!(quiet, "Disk usage at {}%", 91);

    println!("\n5. JSON output:");
    let json = Logger::init(&config.clone().with_format("json"), ServiceInfo::default(), None)?;
    json.info().float("latency_ms", 12.5).msg("one object per line");

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
