//! Hardware timer module using ESP-IDF's esp_timer API.
//!
//! Creates the two periodic timers that drive the firmware: the sampling
//! tick (reads the ADC and batches readings) and the stability tick.
//! Both callbacks execute in the ESP timer task context (not ISR), so
//! they can safely read the ADC and call push_event().
//!
//! On simulation targets the main loop drives both cadences itself.

#[cfg(target_os = "espidf")]
use crate::events::{Event, push_event};
#[cfg(target_os = "espidf")]
use crate::sensors::proximity;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut SAMPLING_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut STABILITY_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: SAMPLING_TIMER is written once in `start_timers()` before any
/// timer callbacks fire.  Only called from the single main task.
#[cfg(target_os = "espidf")]
unsafe fn sampling_timer() -> esp_timer_handle_t {
    unsafe { SAMPLING_TIMER }
}

/// SAFETY: Same invariants as `sampling_timer()`.
#[cfg(target_os = "espidf")]
unsafe fn stability_timer() -> esp_timer_handle_t {
    unsafe { STABILITY_TIMER }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn sampling_tick_cb(_arg: *mut core::ffi::c_void) {
    // Runs in the esp_timer dispatch task: the ADC read is fine here and
    // the main loop is only notified when a whole batch is ready.
    if proximity::sample_tick() {
        push_event(Event::SampleReady);
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn stability_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::StabilityTick);
}

/// Start the hardware tick timers.
///
/// - sampling timer at `sample_interval_ms` (one ADC reading per tick)
/// - stability timer at `stability_period_ms`
#[cfg(target_os = "espidf")]
pub fn start_timers(sample_interval_ms: u32, stability_period_ms: u32) {
    // SAFETY: SAMPLING_TIMER and STABILITY_TIMER are written here once at
    // boot from the single main-task context before any timer callbacks
    // fire.  The callbacks only touch the batch buffers and the lock-free
    // event queue.
    unsafe {
        let sampling_args = esp_timer_create_args_t {
            callback: Some(sampling_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"sampling\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&sampling_args, &raw mut SAMPLING_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: sampling timer create failed (rc={}) — no readings will flow",
                ret
            );
            return;
        }
        let ret = esp_timer_start_periodic(SAMPLING_TIMER, u64::from(sample_interval_ms) * 1_000);
        if ret != ESP_OK {
            log::error!("hw_timer: sampling timer start failed (rc={})", ret);
            return;
        }

        let stability_args = esp_timer_create_args_t {
            callback: Some(stability_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"stability\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&stability_args, &raw mut STABILITY_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: stability timer create failed (rc={}) — continuing without checks",
                ret
            );
            return;
        }
        let ret = esp_timer_start_periodic(STABILITY_TIMER, u64::from(stability_period_ms) * 1_000);
        if ret != ESP_OK {
            log::error!("hw_timer: stability timer start failed (rc={})", ret);
            return;
        }

        info!(
            "hw_timer: sampling@{}ms + stability@{}ms started",
            sample_interval_ms, stability_period_ms
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers(_sample_interval_ms: u32, _stability_period_ms: u32) {
    log::info!("hw_timer(sim): timers not started (events driven by sleep loop)");
}

/// Stop all hardware tick timers.
#[cfg(target_os = "espidf")]
pub fn stop_timers() {
    // SAFETY: handles are valid if start_timers() succeeded; null-check
    // prevents stopping a timer that never got created.
    unsafe {
        // SAFETY: sampling_timer()/stability_timer() contract — main task only.
        let st = sampling_timer();
        if !st.is_null() {
            esp_timer_stop(st);
        }
        let wt = stability_timer();
        if !wt.is_null() {
            esp_timer_stop(wt);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_timers() {}
