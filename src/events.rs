//! Timer-driven event system.
//!
//! Events are produced by:
//! - the sampling timer callback (batch completion)
//! - the stability timer callback (periodic re-check)
//!
//! Events are consumed by the main control loop, which processes them
//! one at a time in arrival order.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Sampling timer   │────▶│              │     │              │
//! │ Stability timer  │────▶│  Event Queue │────▶│  Main Loop   │
//! └──────────────────┘     │  (lock-free) │     │  (consumer)  │
//!                          └──────────────┘     └──────────────┘
//! ```
//!
//! The queue is the atomic hand-off between the timer task and the main
//! loop: ingestion and stability checks both execute on the consumer side,
//! so neither can re-enter the engine mid-update.

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 16;

/// System event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    // ── Sensor data ───────────────────────────────────────
    /// A full sample batch is ready for copy-out.
    SampleReady = 10,

    // ── Control ───────────────────────────────────────────
    /// Stability re-check timer fired.
    StabilityTick = 20,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// Timer callbacks write (produce), main loop reads (consume).
// Uses atomic head/tail indices.  The buffer is intentionally
// kept in a static so timer callbacks can access it.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: EVENT_BUFFER is written only at `head` by the single producer
// (the esp-timer dispatch task) and read only at `tail` by the single
// consumer (the main loop). Head/tail are published with release stores
// and observed with acquire loads, so a slot is never read before its
// write is visible.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from timer-callback context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop event.
    }

    // SAFETY: single producer; the slot at `head` is outside the readable
    // region until the Release store below publishes it.
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    // SAFETY: single consumer; the Acquire load of `head` above makes the
    // producer's write to this slot visible before we read it.
    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending events into a callback.
/// Processes events in FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Check if the event queue is empty.
pub fn queue_is_empty() -> bool {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);
    tail == head
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        10 => Some(Event::SampleReady),
        20 => Some(Event::StabilityTick),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The queue is a process-wide static, so exercise it in one test to
    // avoid cross-test interference under the parallel test runner.
    #[test]
    fn fifo_order_and_capacity() {
        drain_events(|_| {});
        assert!(queue_is_empty());

        assert!(push_event(Event::SampleReady));
        assert!(push_event(Event::StabilityTick));
        assert_eq!(queue_len(), 2);

        assert_eq!(pop_event(), Some(Event::SampleReady));
        assert_eq!(pop_event(), Some(Event::StabilityTick));
        assert_eq!(pop_event(), None);

        // One slot is sacrificed to distinguish full from empty.
        for _ in 0..EVENT_QUEUE_CAP - 1 {
            assert!(push_event(Event::SampleReady));
        }
        assert!(!push_event(Event::StabilityTick), "queue must report full");
        drain_events(|_| {});
        assert!(queue_is_empty());
    }
}
