//! Bounded delivery channel between log call sites and the remote dispatcher
//!
//! Producers never block: when the queue is full the payload is dropped, the
//! drop is counted and an alert goes to stderr on the first drop and on every
//! 1000th one after that.

use crate::core::LoggerMetrics;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Callback invoked with the running drop count whenever an alert fires
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;

const ALERT_EVERY: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelState {
    /// Created, dispatcher not started yet
    Idle = 0,
    /// Dispatcher consuming
    Running = 1,
    /// Producer side closed; terminal
    Closed = 2,
}

impl ChannelState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ChannelState::Idle,
            1 => ChannelState::Running,
            _ => ChannelState::Closed,
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelState::Idle => "idle",
            ChannelState::Running => "running",
            ChannelState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Result of offering one payload to the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    Enqueued,
    /// Queue full, payload discarded
    Dropped,
    /// Channel closed, payload discarded
    Closed,
}

/// Producer half of the remote pipeline
pub struct DeliveryChannel {
    sender: RwLock<Option<Sender<Vec<u8>>>>,
    state: AtomicU8,
    capacity: usize,
    metrics: Arc<LoggerMetrics>,
    on_overflow: Option<OverflowCallback>,
}

impl DeliveryChannel {
    /// Create a channel holding at most `capacity` payloads (minimum 1).
    ///
    /// Returns the producer handle and the receiver the dispatcher consumes.
    pub fn bounded(capacity: usize, metrics: Arc<LoggerMetrics>) -> (Self, Receiver<Vec<u8>>) {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        let channel = Self {
            sender: RwLock::new(Some(sender)),
            state: AtomicU8::new(ChannelState::Idle as u8),
            capacity,
            metrics,
            on_overflow: None,
        };
        (channel, receiver)
    }

    #[must_use]
    pub fn with_overflow_callback(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    pub fn state(&self) -> ChannelState {
        ChannelState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Payloads currently waiting for the dispatcher
    pub fn pending(&self) -> usize {
        self.sender.read().as_ref().map_or(0, Sender::len)
    }

    /// Idle -> Running. No effect once closed.
    pub fn mark_running(&self) {
        let _ = self.state.compare_exchange(
            ChannelState::Idle as u8,
            ChannelState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Offer a serialized record without blocking
    pub fn offer(&self, payload: Vec<u8>) -> OfferOutcome {
        if self.state() == ChannelState::Closed {
            return OfferOutcome::Closed;
        }

        let guard = self.sender.read();
        let Some(sender) = guard.as_ref() else {
            return OfferOutcome::Closed;
        };

        match sender.try_send(payload) {
            Ok(()) => {
                self.metrics.record_remote_enqueued();
                OfferOutcome::Enqueued
            }
            Err(TrySendError::Full(_)) => {
                self.alert_and_drop();
                OfferOutcome::Dropped
            }
            Err(TrySendError::Disconnected(_)) => OfferOutcome::Closed,
        }
    }

    /// Running -> Closed. Dropping the sender lets the dispatcher drain and exit.
    ///
    /// Returns `false` when the channel was already closed.
    pub fn close(&self) -> bool {
        let previous = self.state.swap(ChannelState::Closed as u8, Ordering::AcqRel);
        drop(self.sender.write().take());
        ChannelState::from_u8(previous) != ChannelState::Closed
    }

    fn alert_and_drop(&self) {
        let dropped_count = self.metrics.record_remote_dropped() + 1;

        if dropped_count == 1 || dropped_count.is_multiple_of(ALERT_EVERY) {
            eprintln!(
                "[LOGGER WARNING] Remote queue full, {} events dropped. \
                 Consider increasing remote.buffer_size.",
                dropped_count
            );

            if let Some(ref callback) = self.on_overflow {
                callback(dropped_count);
            }
        }
    }
}

impl fmt::Debug for DeliveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryChannel")
            .field("state", &self.state())
            .field("capacity", &self.capacity)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    fn channel(capacity: usize) -> (DeliveryChannel, Receiver<Vec<u8>>, Arc<LoggerMetrics>) {
        let metrics = Arc::new(LoggerMetrics::new());
        let (channel, receiver) = DeliveryChannel::bounded(capacity, Arc::clone(&metrics));
        (channel, receiver, metrics)
    }

    #[test]
    fn test_state_transitions() {
        let (channel, _rx, _) = channel(4);
        assert_eq!(channel.state(), ChannelState::Idle);

        channel.mark_running();
        assert_eq!(channel.state(), ChannelState::Running);

        assert!(channel.close());
        assert_eq!(channel.state(), ChannelState::Closed);
        assert!(!channel.close());

        channel.mark_running();
        assert_eq!(channel.state(), ChannelState::Closed);
    }

    #[test]
    fn test_offer_enqueues() {
        let (channel, rx, metrics) = channel(4);
        channel.mark_running();

        assert_eq!(channel.offer(b"one".to_vec()), OfferOutcome::Enqueued);
        assert_eq!(channel.pending(), 1);
        assert_eq!(rx.recv().unwrap(), b"one");
        assert_eq!(metrics.remote_enqueued(), 1);
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (channel, _rx, metrics) = channel(2);
        channel.mark_running();

        let outcomes: Vec<_> = (0..5).map(|i| channel.offer(vec![i])).collect();

        assert_eq!(outcomes.iter().filter(|o| **o == OfferOutcome::Enqueued).count(), 2);
        assert_eq!(outcomes.iter().filter(|o| **o == OfferOutcome::Dropped).count(), 3);
        assert_eq!(metrics.remote_dropped(), 3);
    }

    #[test]
    fn test_overflow_callback_rate_limited() {
        let calls = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&calls);
        let (channel, _rx, _) = channel(1);
        let channel = channel.with_overflow_callback(Arc::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        channel.offer(vec![0]);
        for _ in 0..1500 {
            channel.offer(vec![1]);
        }

        // first drop and the 1000th
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_closed_channel_rejects() {
        let (channel, rx, _) = channel(4);
        channel.mark_running();
        channel.offer(b"before".to_vec());
        channel.close();

        assert_eq!(channel.offer(b"after".to_vec()), OfferOutcome::Closed);
        assert_eq!(rx.recv().unwrap(), b"before");
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let (channel, _rx, _) = channel(0);
        assert_eq!(channel.capacity(), 1);
        assert_eq!(channel.offer(vec![7]), OfferOutcome::Enqueued);
    }
}
