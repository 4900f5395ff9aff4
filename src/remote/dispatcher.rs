//! Background consumer of the delivery channel

use super::client::RemoteClient;
use super::event::RemoteEvent;
use crate::config::ServiceInfo;
use crate::core::error::{LoggerError, Result};
use crate::core::output_format::decode_json;
use crate::core::LoggerMetrics;
use crossbeam_channel::Receiver;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

pub const DISPATCHER_THREAD_NAME: &str = "log-remote-dispatcher";

/// Decodes serialized records, transforms them and hands them to the client.
///
/// Owns the client for its whole life. Every failure is reported on stderr and
/// counted; the loop only ends when all producers are gone.
pub struct Dispatcher {
    receiver: Receiver<Vec<u8>>,
    client: Box<dyn RemoteClient>,
    metrics: Arc<LoggerMetrics>,
    service: ServiceInfo,
    debug: bool,
}

impl Dispatcher {
    pub fn new(
        receiver: Receiver<Vec<u8>>,
        client: Box<dyn RemoteClient>,
        metrics: Arc<LoggerMetrics>,
        service: ServiceInfo,
    ) -> Self {
        Self {
            receiver,
            client,
            metrics,
            service,
            debug: false,
        }
    }

    /// Also report successful deliveries on stderr
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Start the consumer thread
    pub fn spawn(self) -> Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name(DISPATCHER_THREAD_NAME.to_string())
            .spawn(move || self.run())
            .map_err(|e| {
                LoggerError::io_operation("spawning dispatcher", "thread creation failed", e)
            })
    }

    /// Block on the channel until it is closed and drained
    pub fn run(mut self) {
        let receiver = self.receiver.clone();
        for payload in receiver.iter() {
            self.dispatch(&payload);
        }
        if self.debug {
            eprintln!(
                "[LOGGER DEBUG] Remote dispatcher ({}) stopped",
                self.client.name()
            );
        }
    }

    fn dispatch(&mut self, payload: &[u8]) {
        let record = match decode_json(payload) {
            Ok(record) => record,
            Err(e) => {
                self.metrics.record_decode_failure();
                eprintln!("[LOGGER ERROR] Skipping undecodable remote record: {}", e);
                return;
            }
        };

        let event = RemoteEvent::from_record(&record).with_service(&self.service);
        let client = &mut self.client;
        let outcome = catch_unwind(AssertUnwindSafe(|| client.capture(&event)));

        match outcome {
            Ok(Ok(())) => {
                self.metrics.record_remote_delivered();
                if self.debug {
                    eprintln!(
                        "[LOGGER DEBUG] Delivered event {} via {}",
                        event.event_id,
                        self.client.name()
                    );
                }
            }
            Ok(Err(e @ LoggerError::DeliveryTimeout { .. })) => {
                self.metrics.record_remote_timeout();
                eprintln!(
                    "[LOGGER WARNING] Abandoned event {}: {}",
                    event.event_id, e
                );
            }
            Ok(Err(e)) => {
                self.metrics.record_remote_failed();
                eprintln!(
                    "[LOGGER ERROR] Remote client {} failed: {}",
                    self.client.name(),
                    e
                );
            }
            Err(panic_info) => {
                self.metrics.record_remote_failed();
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                eprintln!(
                    "[LOGGER CRITICAL] Remote client {} panicked: {}. Dispatcher continues.",
                    self.client.name(),
                    panic_msg
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output_format::encode_json;
    use crate::core::{Caller, ErrorValue, LogLevel, LogRecord};
    use crate::remote::client::MemoryClient;
    use crossbeam_channel::bounded;
    use std::time::Duration;

    struct ScriptedClient {
        calls: usize,
    }

    impl RemoteClient for ScriptedClient {
        fn capture(&mut self, _event: &RemoteEvent) -> Result<()> {
            self.calls += 1;
            match self.calls {
                1 => Err(LoggerError::DeliveryTimeout {
                    timeout: Duration::from_millis(10),
                }),
                2 => Err(LoggerError::delivery("503")),
                3 => panic!("client bug"),
                _ => Ok(()),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn payload(message: &str) -> Vec<u8> {
        let record = LogRecord::new(LogLevel::Error, message)
            .with_caller(Caller::new("src/lib.rs", 3))
            .with_error(ErrorValue::new("cause"));
        encode_json(&record, true).unwrap()
    }

    #[test]
    fn test_dispatches_until_closed() {
        let (tx, rx) = bounded(8);
        let client = MemoryClient::new();
        let metrics = Arc::new(LoggerMetrics::new());
        let handle = Dispatcher::new(
            rx,
            Box::new(client.clone()),
            Arc::clone(&metrics),
            ServiceInfo::new("test", "svc", "0.1.0"),
        )
        .spawn()
        .unwrap();

        tx.send(payload("first")).unwrap();
        tx.send(payload("second")).unwrap();
        drop(tx);
        handle.join().unwrap();

        let events = client.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "first");
        assert_eq!(events[0].environment.as_deref(), Some("test"));
        assert!(events[0].first_exception().is_some());
        assert_eq!(metrics.remote_delivered(), 2);
    }

    #[test]
    fn test_decode_failure_does_not_stop_loop() {
        let (tx, rx) = bounded(8);
        let client = MemoryClient::new();
        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = Dispatcher::new(
            rx,
            Box::new(client.clone()),
            Arc::clone(&metrics),
            ServiceInfo::default(),
        );

        tx.send(b"{not json".to_vec()).unwrap();
        tx.send(payload("after garbage")).unwrap();
        drop(tx);
        dispatcher.run();

        assert_eq!(metrics.decode_failures(), 1);
        assert_eq!(client.len(), 1);
        assert_eq!(client.events()[0].message, "after garbage");
    }

    #[test]
    fn test_client_failures_are_counted_and_swallowed() {
        let (tx, rx) = bounded(8);
        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = Dispatcher::new(
            rx,
            Box::new(ScriptedClient { calls: 0 }),
            Arc::clone(&metrics),
            ServiceInfo::default(),
        );

        for i in 0..4 {
            tx.send(payload(&format!("event {}", i))).unwrap();
        }
        drop(tx);
        dispatcher.run();

        assert_eq!(metrics.remote_timeouts(), 1);
        assert_eq!(metrics.remote_failed(), 2);
        assert_eq!(metrics.remote_delivered(), 1);
        assert_eq!(metrics.remote_settled(), 4);
    }
}
