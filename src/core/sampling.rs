//! Log sampling for high-volume call sites
//!
//! A sampled logger asks its [`Sampler`] before building each record. Events
//! the sampler rejects are treated like events below the minimum level: no
//! fields are collected and nothing is written.
//!
//! # Example
//!
//! ```
//! use rust_log_facade::{BasicSampler, LogLevel, Logger, RateSampler};
//!
//! let logger = Logger::default();
//!
//! // Every 10th record
//! let every_tenth = logger.sample(BasicSampler::new(10));
//!
//! // 5% of records, errors and worse always pass
//! let sparse = logger.sample(RateSampler::new(0.05));
//! # let _ = (every_tenth, sparse);
//! ```

use super::log_level::LogLevel;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Decides per record whether it is written
pub trait Sampler: Send + Sync {
    fn sample(&self, level: LogLevel) -> bool;
}

impl<F> Sampler for F
where
    F: Fn(LogLevel) -> bool + Send + Sync,
{
    fn sample(&self, level: LogLevel) -> bool {
        self(level)
    }
}

/// Counters for sampling observability
#[derive(Debug, Default)]
pub struct SamplerMetrics {
    sampled_count: AtomicU64,
    dropped_count: AtomicU64,
}

impl SamplerMetrics {
    pub const fn new() -> Self {
        Self {
            sampled_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn sampled_count(&self) -> u64 {
        self.sampled_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub fn total_count(&self) -> u64 {
        self.sampled_count() + self.dropped_count()
    }

    /// 1.0 until something was processed
    pub fn effective_sample_rate(&self) -> f64 {
        let total = self.total_count();
        if total == 0 {
            1.0
        } else {
            self.sampled_count() as f64 / total as f64
        }
    }

    fn record(&self, sampled: bool) -> bool {
        if sampled {
            self.sampled_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.dropped_count.fetch_add(1, Ordering::Relaxed);
        }
        sampled
    }
}

/// Passes one record out of every `n`, starting with the first
#[derive(Debug)]
pub struct BasicSampler {
    n: u64,
    counter: AtomicU64,
    metrics: SamplerMetrics,
}

impl BasicSampler {
    /// `n` of 0 or 1 passes everything
    pub fn new(n: u64) -> Self {
        Self {
            n: n.max(1),
            counter: AtomicU64::new(0),
            metrics: SamplerMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }
}

impl Sampler for BasicSampler {
    fn sample(&self, _level: LogLevel) -> bool {
        let seen = self.counter.fetch_add(1, Ordering::Relaxed);
        self.metrics.record(seen % self.n == 0)
    }
}

/// Random sampling at a fixed rate, with levels that always pass
#[derive(Debug)]
pub struct RateSampler {
    rate: f64,
    always_sample: Vec<LogLevel>,
    metrics: SamplerMetrics,
}

impl RateSampler {
    /// `rate` is clamped to 0.0..=1.0. Error, fatal and panic always pass.
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
            always_sample: vec![LogLevel::Error, LogLevel::Fatal, LogLevel::Panic],
            metrics: SamplerMetrics::new(),
        }
    }

    #[must_use]
    pub fn with_always_sample(mut self, levels: Vec<LogLevel>) -> Self {
        self.always_sample = levels;
        self
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }
}

impl Sampler for RateSampler {
    fn sample(&self, level: LogLevel) -> bool {
        if self.always_sample.contains(&level) || self.rate >= 1.0 {
            return self.metrics.record(true);
        }
        if self.rate <= 0.0 {
            return self.metrics.record(false);
        }
        self.metrics.record(rand::thread_rng().gen::<f64>() < self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sampler_every_nth() {
        let sampler = BasicSampler::new(3);
        let passed: Vec<bool> = (0..7).map(|_| sampler.sample(LogLevel::Info)).collect();

        assert_eq!(passed, [true, false, false, true, false, false, true]);
        assert_eq!(sampler.metrics().sampled_count(), 3);
        assert_eq!(sampler.metrics().dropped_count(), 4);
    }

    #[test]
    fn test_basic_sampler_zero_passes_everything() {
        let sampler = BasicSampler::new(0);
        assert!((0..5).all(|_| sampler.sample(LogLevel::Debug)));
    }

    #[test]
    fn test_rate_sampler_bounds() {
        let none = RateSampler::new(-1.0);
        let all = RateSampler::new(2.0);
        assert_eq!(none.rate(), 0.0);
        assert_eq!(all.rate(), 1.0);

        for _ in 0..100 {
            assert!(!none.sample(LogLevel::Info));
            assert!(all.sample(LogLevel::Info));
        }
        assert_eq!(none.metrics().effective_sample_rate(), 0.0);
        assert_eq!(all.metrics().effective_sample_rate(), 1.0);
    }

    #[test]
    fn test_rate_sampler_always_samples_critical_levels() {
        let sampler = RateSampler::new(0.0);
        assert!(sampler.sample(LogLevel::Error));
        assert!(sampler.sample(LogLevel::Panic));
        assert!(!sampler.sample(LogLevel::Warn));

        let custom = RateSampler::new(0.0).with_always_sample(vec![LogLevel::Warn]);
        assert!(custom.sample(LogLevel::Warn));
        assert!(!custom.sample(LogLevel::Error));
    }

    #[test]
    fn test_rate_sampler_roughly_matches_rate() {
        let sampler = RateSampler::new(0.5);
        for _ in 0..10_000 {
            sampler.sample(LogLevel::Debug);
        }
        let rate = sampler.metrics().effective_sample_rate();
        assert!(rate > 0.4 && rate < 0.6, "rate was {}", rate);
    }

    #[test]
    fn test_closure_sampler() {
        let warnings_only = |level: LogLevel| level >= LogLevel::Warn;
        assert!(!warnings_only.sample(LogLevel::Info));
        assert!(warnings_only.sample(LogLevel::Warn));
    }
}
