//! Logger metrics for observability
//!
//! Counters shared between the facade and the remote dispatcher. They are the
//! only place where dropped or undeliverable remote events become visible to
//! the host process.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_log_facade::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_written();
/// metrics.record_remote_dropped();
///
/// assert_eq!(metrics.records_written(), 1);
/// assert_eq!(metrics.remote_dropped(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records written to the primary sink
    records_written: AtomicU64,

    /// Primary sink write failures
    write_failures: AtomicU64,

    /// Remote events accepted by the delivery channel
    remote_enqueued: AtomicU64,

    /// Remote events dropped because the channel was full or closed
    remote_dropped: AtomicU64,

    /// Remote events accepted by the remote client
    remote_delivered: AtomicU64,

    /// Remote deliveries that failed for reasons other than a timeout
    remote_failed: AtomicU64,

    /// Remote deliveries abandoned after the flush timeout
    remote_timeouts: AtomicU64,

    /// Channel payloads the dispatcher could not decode
    decode_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            remote_enqueued: AtomicU64::new(0),
            remote_dropped: AtomicU64::new(0),
            remote_delivered: AtomicU64::new(0),
            remote_failed: AtomicU64::new(0),
            remote_timeouts: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn remote_enqueued(&self) -> u64 {
        self.remote_enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn remote_dropped(&self) -> u64 {
        self.remote_dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn remote_delivered(&self) -> u64 {
        self.remote_delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn remote_failed(&self) -> u64 {
        self.remote_failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn remote_timeouts(&self) -> u64 {
        self.remote_timeouts.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures.load(Ordering::Relaxed)
    }

    /// Returns the previous value, like the other `record_*` methods
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.records_written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_remote_enqueued(&self) -> u64 {
        self.remote_enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_remote_dropped(&self) -> u64 {
        self.remote_dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_remote_delivered(&self) -> u64 {
        self.remote_delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_remote_failed(&self) -> u64 {
        self.remote_failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_remote_timeout(&self) -> u64 {
        self.remote_timeouts.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_decode_failure(&self) -> u64 {
        self.decode_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Remote drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no remote events were offered.
    pub fn remote_drop_rate(&self) -> f64 {
        let dropped = self.remote_dropped() as f64;
        let total = self.remote_enqueued() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Remote events that left the dispatcher one way or another
    pub fn remote_settled(&self) -> u64 {
        self.remote_delivered() + self.remote_failed() + self.remote_timeouts() + self.decode_failures()
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        for counter in [
            &self.records_written,
            &self.write_failures,
            &self.remote_enqueued,
            &self.remote_dropped,
            &self.remote_delivered,
            &self.remote_failed,
            &self.remote_timeouts,
            &self.decode_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            records_written: AtomicU64::new(self.records_written()),
            write_failures: AtomicU64::new(self.write_failures()),
            remote_enqueued: AtomicU64::new(self.remote_enqueued()),
            remote_dropped: AtomicU64::new(self.remote_dropped()),
            remote_delivered: AtomicU64::new(self.remote_delivered()),
            remote_failed: AtomicU64::new(self.remote_failed()),
            remote_timeouts: AtomicU64::new(self.remote_timeouts()),
            decode_failures: AtomicU64::new(self.decode_failures()),
        }
    }
}
