//! Analog proximity sensor acquisition.
//!
//! The sampling tick reads the ADC and records one reading into the
//! filling half of a double buffer. When a batch completes, the halves
//! swap and a ready flag is raised; the main loop copies the finished
//! batch out before the other half can fill. Producer (esp-timer dispatch
//! task) and consumer (main loop) touch disjoint halves, so plain atomics
//! carry the hand-off.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the proximity channel via the oneshot API
//! (initialised by hw_init). On host/test: reads from a static
//! `AtomicU16` for injection.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::warn;

use crate::engine::WINDOW_SIZE;
use crate::error::SensorError;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
static SIM_PROXIMITY_ADC: core::sync::atomic::AtomicU16 = core::sync::atomic::AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
static SIM_ADC_FAULT: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_proximity_adc(raw: u16) {
    SIM_PROXIMITY_ADC.store(raw, Ordering::Relaxed);
}

/// Make subsequent simulated reads fail, as a faulted converter would.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc_fault(faulted: bool) {
    SIM_ADC_FAULT.store(faulted, Ordering::Relaxed);
}

/// Readings per delivered batch. One batch fills the engine window, so
/// a batch completes every `BATCH_LEN` sampling ticks (500 ms at the
/// default cadence) while the consumer drains within one tick.
pub const BATCH_LEN: usize = WINDOW_SIZE;

struct BatchBuffers(UnsafeCell<[[u16; BATCH_LEN]; 2]>);

// SAFETY: the two halves are never touched by both sides at once. The
// sampling tick writes only the half indexed by ACTIVE; the consumer
// reads only the other half, and only after the Release store on
// BATCH_READY has published the producer's writes.
unsafe impl Sync for BatchBuffers {}

static BUFFERS: BatchBuffers = BatchBuffers(UnsafeCell::new([[0; BATCH_LEN]; 2]));

/// Index of the half currently being filled. Written by the producer only.
static ACTIVE: AtomicUsize = AtomicUsize::new(0);

/// Fill level of the active half. Producer-private; atomic only because
/// it lives in a static.
static FILL: AtomicUsize = AtomicUsize::new(0);

/// Hand-off flag: producer sets with Release after a swap, consumer
/// clears with an Acquire swap before copying the finished half out.
static BATCH_READY: AtomicBool = AtomicBool::new(false);

/// One sampling tick: read the ADC and record the reading.
///
/// Returns `true` when this tick completed a batch and raised the ready
/// flag. A failed read records nothing; the batch simply completes one
/// tick later. Runs in the sampling timer's dispatch task, never in the
/// main loop.
pub fn sample_tick() -> bool {
    let Some(raw) = read_adc() else {
        warn!("sample skipped: {}", SensorError::AdcReadFailed);
        return false;
    };
    record_sample(raw)
}

fn record_sample(raw: u16) -> bool {
    let active = ACTIVE.load(Ordering::Relaxed);
    let fill = FILL.load(Ordering::Relaxed);

    // SAFETY: only this function writes buffer cells, only on the active
    // half, and the consumer does not read that half until the swap
    // below moves ACTIVE away from it.
    unsafe {
        (*BUFFERS.0.get())[active][fill] = raw;
    }

    let fill = fill + 1;
    if fill < BATCH_LEN {
        FILL.store(fill, Ordering::Relaxed);
        return false;
    }

    FILL.store(0, Ordering::Relaxed);
    ACTIVE.store(active ^ 1, Ordering::Relaxed);
    // Release orders the batch writes before the flag the consumer polls.
    BATCH_READY.store(true, Ordering::Release);
    true
}

/// Copy the finished batch out if one is waiting.
///
/// The copy is mandatory: the underlying half is reused as soon as the
/// producer wraps around, so callers must not hold on to buffer memory.
pub fn take_batch(out: &mut [u16; BATCH_LEN]) -> bool {
    if !BATCH_READY.swap(false, Ordering::Acquire) {
        return false;
    }

    let finished = ACTIVE.load(Ordering::Relaxed) ^ 1;
    // SAFETY: the Acquire swap above ordered this read after the
    // producer's writes to the finished half, and the producer is now
    // filling the other half.
    unsafe {
        out.copy_from_slice(&(*BUFFERS.0.get())[finished]);
    }
    true
}

#[cfg(target_os = "espidf")]
fn read_adc() -> Option<u16> {
    hw_init::adc1_read_proximity()
}

#[cfg(not(target_os = "espidf"))]
fn read_adc() -> Option<u16> {
    if SIM_ADC_FAULT.load(Ordering::Relaxed) {
        return None;
    }
    Some(SIM_PROXIMITY_ADC.load(Ordering::Relaxed))
}
