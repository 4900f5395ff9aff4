//! Remote error reporting: severity mapping, event transformation, the
//! bounded delivery channel and its background dispatcher.

pub mod channel;
pub mod client;
pub mod dispatcher;
pub mod event;
pub mod severity;

pub use channel::{ChannelState, DeliveryChannel, OfferOutcome, OverflowCallback};
#[cfg(feature = "remote")]
pub use client::HttpTransport;
pub use client::{Dsn, MemoryClient, RemoteClient};
pub use dispatcher::Dispatcher;
pub use event::{qualifies, Exception, RemoteEvent, Stacktrace, REMOTE_THRESHOLD};
pub use severity::Severity;

use crate::config::ServiceInfo;
use crate::core::error::Result;
use crate::core::LoggerMetrics;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for the remote pipeline (5 seconds)
///
/// Used when the last logger handle is dropped without explicit shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Running channel plus the dispatcher thread draining it
pub struct RemotePipeline {
    channel: DeliveryChannel,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    metrics: Arc<LoggerMetrics>,
}

impl RemotePipeline {
    /// Idle -> Running: create the channel and start the dispatcher
    pub fn start(
        client: Box<dyn RemoteClient>,
        capacity: usize,
        metrics: Arc<LoggerMetrics>,
        service: ServiceInfo,
        debug: bool,
        on_overflow: Option<OverflowCallback>,
    ) -> Result<Self> {
        let (mut channel, receiver) = DeliveryChannel::bounded(capacity, Arc::clone(&metrics));
        if let Some(callback) = on_overflow {
            channel = channel.with_overflow_callback(callback);
        }

        let handle = Dispatcher::new(receiver, client, Arc::clone(&metrics), service)
            .with_debug(debug)
            .spawn()?;
        channel.mark_running();

        Ok(Self {
            channel,
            handle: Mutex::new(Some(handle)),
            metrics,
        })
    }

    #[inline]
    pub fn offer(&self, payload: Vec<u8>) -> OfferOutcome {
        self.channel.offer(payload)
    }

    pub fn state(&self) -> ChannelState {
        self.channel.state()
    }

    pub fn pending(&self) -> usize {
        self.channel.pending()
    }

    /// Running -> Closed, then wait up to `timeout` for the dispatcher to drain.
    ///
    /// Returns `true` if the dispatcher finished within the timeout. A second
    /// call finds nothing to wait for and returns `true`.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.channel.close();

        let Some(handle) = self.handle.lock().take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Remote dispatcher panicked during shutdown: {:?}", e);
                    return false;
                }
                break;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Remote dispatcher did not finish within {:?}. \
                     {} queued events may be lost.",
                    timeout,
                    self.channel.pending()
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }

        let dropped = self.metrics.remote_dropped();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Remote pipeline closed with {} dropped events (drop rate: {:.2}%)",
                dropped,
                self.metrics.remote_drop_rate()
            );
        }
        true
    }
}

impl Drop for RemotePipeline {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

impl fmt::Debug for RemotePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemotePipeline")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
