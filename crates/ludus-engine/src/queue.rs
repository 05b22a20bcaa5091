use std::sync::mpsc;
use std::time::Duration;

use ludus_core::{ErrorCode, RuntimeError, RuntimeResult};

use crate::event::EngineEvent;

/// The sending half of an engine event queue: cloneable, so multiple
/// producers (the host, and — for an engine's own outbox — the worker
/// itself echoing events) can push without coordinating.
///
/// Grounded in `includes/surena/engine.h`'s `eevent_queue_push`, and built
/// directly on [`std::sync::mpsc`] rather than a hand-rolled
/// mutex+condvar ring buffer: `mpsc::Sender` is already a true
/// multi-producer handle, `send` is non-blocking on the unbounded channel
/// (Q1), and `Receiver::recv_timeout` gives Q2/Q3's bounded-wait pop for
/// free. `original_source/src/engines/randomengine.cpp`'s worker loop
/// pops its inbox with exactly this non-blocking/blocking-with-timeout
/// split (`eevent_queue_pop(&data.inbox, &e, 1000)`).
#[derive(Clone)]
pub struct EventQueueSender {
    tx: mpsc::Sender<EngineEvent>,
}

/// The receiving half: single-consumer, matching the one worker (or one
/// host loop) that drains a given queue.
pub struct EventQueueReceiver {
    rx: mpsc::Receiver<EngineEvent>,
}

/// Creates a fresh queue's sender/receiver pair (`eevent_queue_create`).
pub fn channel() -> (EventQueueSender, EventQueueReceiver) {
    let (tx, rx) = mpsc::channel();
    (EventQueueSender { tx }, EventQueueReceiver { rx })
}

impl EventQueueSender {
    /// Pushes `event`. Non-blocking (Q1); fails only if every receiver has
    /// already been dropped, which the caller surfaces as
    /// [`ErrorCode::StateUnrecoverable`] since there is no queue left to
    /// wake.
    pub fn push(&self, event: EngineEvent) -> RuntimeResult<()> {
        self.tx.send(event).map_err(|_| {
            RuntimeError::with_detail(ErrorCode::StateUnrecoverable, "event queue receiver is gone")
        })
    }
}

impl EventQueueReceiver {
    /// Pops the head event, or a `NULL`-typed event (engine_id `0`) if
    /// `timeout` elapses first.
    ///
    /// `timeout == Duration::ZERO` is Q2: a non-blocking check. Any larger
    /// timeout is Q3: wait up to that long on the condition before giving
    /// up. Events are always handed back in push order (Q4), which is
    /// `mpsc`'s own ordering guarantee.
    pub fn pop(&self, timeout: Duration) -> EngineEvent {
        let received = if timeout.is_zero() {
            self.rx.try_recv().ok()
        } else {
            self.rx.recv_timeout(timeout).ok()
        };
        received.unwrap_or_else(|| EngineEvent::null(0))
    }
}

// Q5 (destroying a queue drains and destroys all pending events) falls
// out of ordinary `Drop`: dropping `EventQueueReceiver` drops the
// `mpsc::Receiver`, which drops every still-buffered `EngineEvent` along
// with it — there is nothing further to release by hand.

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn push_then_pop_preserves_order() {
        let (tx, rx) = channel();
        for id in 0..5 {
            tx.push(EngineEvent::new(id, crate::event::EngineEventPayload::Exit))
                .unwrap();
        }
        for id in 0..5 {
            let e = rx.pop(Duration::from_millis(10));
            assert_eq!(e.engine_id, id);
        }
    }

    #[test]
    fn pop_on_empty_queue_with_zero_timeout_returns_null_immediately() {
        let (_tx, rx) = channel();
        let start = Instant::now();
        let e = rx.pop(Duration::ZERO);
        assert!(e.is_null());
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn pop_with_timeout_waits_at_least_the_timeout_before_returning_null() {
        let (_tx, rx) = channel();
        let start = Instant::now();
        let e = rx.pop(Duration::from_millis(20));
        assert!(e.is_null());
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn concurrent_producers_each_preserve_their_own_order() {
        let (tx, rx) = channel();
        let mut handles = Vec::new();
        for producer in 0..4u32 {
            let tx = tx.clone();
            handles.push(thread::spawn(move || {
                for seq in 0..25u32 {
                    tx.push(EngineEvent::new(
                        producer * 1000 + seq,
                        crate::event::EngineEventPayload::Heartbeat(seq as u64),
                    ))
                    .unwrap();
                }
            }));
        }
        drop(tx);
        for h in handles {
            h.join().unwrap();
        }
        let mut last_seq_per_producer = [None; 4];
        let mut total = 0;
        loop {
            let e = rx.pop(Duration::from_millis(50));
            if e.is_null() {
                break;
            }
            total += 1;
            let producer = (e.engine_id / 1000) as usize;
            let seq = e.engine_id % 1000;
            if let Some(last) = last_seq_per_producer[producer] {
                assert!(seq > last, "producer {producer} delivered out of order");
            }
            last_seq_per_producer[producer] = Some(seq);
        }
        assert_eq!(total, 100);
    }
}
