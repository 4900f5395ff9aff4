//! Per-record hooks
//!
//! A hooked logger runs its hooks on every record it writes, after the
//! message is set and before encoding. Hooks may add fields or rewrite the
//! message; they never see records below the minimum level or rejected by a
//! sampler.

use super::log_entry::LogRecord;

pub trait Hook: Send + Sync {
    fn run(&self, record: &mut LogRecord);
}

impl<F> Hook for F
where
    F: Fn(&mut LogRecord) + Send + Sync,
{
    fn run(&self, record: &mut LogRecord) {
        self(record)
    }
}
