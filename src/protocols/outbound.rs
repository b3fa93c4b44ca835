//! OutboundChannel - the single serialization point for client-bound messages.
//!
//! Every domain agent and every engine-side event source holds a clone of the
//! same channel. A clone shares the underlying sink; it never duplicates it.
//! Calls are serialized by one mutex, so a message handed to the sink is
//! always delivered whole before the next caller gets in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::types::{ApiError, OutboundMessage};

/// Transport callback invoked once per outbound message.
pub type OutboundSink = Box<dyn FnMut(OutboundMessage) -> Result<(), ApiError> + Send>;

struct Shared {
    sink: Mutex<Option<OutboundSink>>,
    delivery_failures: AtomicU64,
}

/// Shared, synchronized handle to the client transport.
#[derive(Clone)]
pub struct OutboundChannel {
    shared: Arc<Shared>,
}

impl OutboundChannel {
    /// Create a channel delivering to `sink`.
    pub fn new<F>(sink: F) -> Self
    where
        F: FnMut(OutboundMessage) -> Result<(), ApiError> + Send + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                sink: Mutex::new(Some(Box::new(sink))),
                delivery_failures: AtomicU64::new(0),
            }),
        }
    }

    /// Deliver a message to the transport.
    ///
    /// Never fails into the caller: a detached or failing transport is logged
    /// and counted in `delivery_failures`.
    pub fn send(&self, message: impl Into<OutboundMessage>) {
        let message = message.into();
        let mut guard = self.shared.sink.lock();

        let result = match guard.as_mut() {
            Some(sink) => sink(message),
            None => Err(ApiError::TransportClosed),
        };

        // Release the lock before logging so a slow logger does not stall senders.
        drop(guard);

        if let Err(e) = result {
            let failures = self.shared.delivery_failures.fetch_add(1, Ordering::Relaxed) + 1;
            match e {
                ApiError::TransportClosed => {
                    log::debug!("Dropped outbound message: transport detached (failures={failures})")
                }
                other => log::warn!("Failed to deliver outbound message: {other} (failures={failures})"),
            }
        }
    }

    /// Detach the transport. Later sends become counted no-ops.
    ///
    /// Returns the sink so the caller can flush or close it.
    pub fn detach(&self) -> Option<OutboundSink> {
        let sink = self.shared.sink.lock().take();
        if sink.is_some() {
            log::info!("Outbound transport detached");
        }
        sink
    }

    pub fn is_attached(&self) -> bool {
        self.shared.sink.lock().is_some()
    }

    /// Number of messages that could not be delivered.
    pub fn delivery_failures(&self) -> u64 {
        self.shared.delivery_failures.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for OutboundChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundChannel")
            .field("attached", &self.is_attached())
            .field("delivery_failures", &self.delivery_failures())
            .finish()
    }
}

/// Test helpers: a channel that records every delivered message.
#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    pub(crate) fn recording_channel() -> (OutboundChannel, Arc<Mutex<Vec<OutboundMessage>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink_log = log.clone();
        let channel = OutboundChannel::new(move |message| {
            sink_log.lock().push(message);
            Ok(())
        });
        (channel, log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Notification, Response, ResponseBody};
    use serde_json::{json, Value};
    use std::thread;

    fn note(method: &str, seq: usize) -> Notification {
        Notification {
            method: method.to_string(),
            params: json!({ "seq": seq }),
        }
    }

    #[test]
    fn test_send_delivers_in_order() {
        let (channel, log) = recording::recording_channel();
        channel.send(note("A.one", 0));
        channel.send(note("A.two", 1));

        let log = log.lock();
        assert_eq!(log.len(), 2);
        assert!(matches!(&log[0], OutboundMessage::Notification(n) if n.method == "A.one"));
        assert!(matches!(&log[1], OutboundMessage::Notification(n) if n.method == "A.two"));
    }

    #[test]
    fn test_send_after_detach_is_counted_noop() {
        let (channel, log) = recording::recording_channel();
        assert!(channel.is_attached());
        assert!(channel.detach().is_some());
        assert!(!channel.is_attached());

        channel.send(note("A.late", 0));

        assert!(log.lock().is_empty());
        assert_eq!(channel.delivery_failures(), 1);
        assert!(channel.detach().is_none());
    }

    #[test]
    fn test_failing_sink_does_not_reach_caller() {
        let channel = OutboundChannel::new(|_| {
            Err(ApiError::IoError {
                message: "broken pipe".to_string(),
            })
        });
        channel.send(note("A.one", 0));
        channel.send(note("A.two", 1));
        assert_eq!(channel.delivery_failures(), 2);
    }

    #[test]
    fn test_concurrent_senders_never_tear_messages() {
        // The sink writes each message in several pieces; without the channel
        // lock, concurrent writers would interleave bytes inside a line.
        let wire = Arc::new(Mutex::new(Vec::<u8>::new()));
        let sink_wire = wire.clone();
        let channel = OutboundChannel::new(move |message| {
            let text = serde_json::to_string(&message).map_err(|e| ApiError::ProtocolError {
                message: e.to_string(),
            })?;
            for chunk in text.as_bytes().chunks(3) {
                sink_wire.lock().extend_from_slice(chunk);
                thread::yield_now();
            }
            sink_wire.lock().push(b'\n');
            Ok(())
        });

        const PER_THREAD: usize = 200;
        let mut handles = Vec::new();
        for name in ["Debugger.paused", "HeapProfiler.heapStatsUpdate"] {
            let notifier = channel.clone();
            handles.push(thread::spawn(move || {
                for seq in 0..PER_THREAD {
                    notifier.send(note(name, seq));
                }
            }));
        }
        for id in 0..PER_THREAD as i64 {
            channel.send(Response {
                id,
                body: ResponseBody::Result(json!({})),
            });
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let wire = wire.lock();
        let text = String::from_utf8(wire.clone()).unwrap();
        let mut next_seq = std::collections::HashMap::new();
        let mut next_id = 0i64;
        let mut lines = 0;
        for line in text.lines() {
            let value: Value = serde_json::from_str(line).expect("torn message on the wire");
            lines += 1;
            if let Some(method) = value.get("method").and_then(Value::as_str) {
                let seq = value["params"]["seq"].as_u64().unwrap() as usize;
                let expected = next_seq.entry(method.to_string()).or_insert(0usize);
                assert_eq!(seq, *expected, "out of order for {method}");
                *expected += 1;
            } else {
                assert_eq!(value["id"].as_i64().unwrap(), next_id);
                next_id += 1;
            }
        }
        assert_eq!(lines, PER_THREAD * 3);
        assert_eq!(channel.delivery_failures(), 0);
    }
}
