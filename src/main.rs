//! ProxiSense Firmware — Main Entry Point
//!
//! Hexagonal architecture with timer-driven batch acquisition.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                   │
//! │                                                            │
//! │   HardwareAdapter                 LogEventSink             │
//! │   (LightPort + LinkPort)          (EventSink)              │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ───────────────      │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │           MonitorService (pure logic)            │      │
//! │  │  Calibration · Stability · Feedback mapping      │      │
//! │  └──────────────────────────────────────────────────┘      │
//! │                                                            │
//! │  Timers (sampling, stability) → event queue → main loop    │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod error;
mod events;
mod pins;

pub mod app;
mod adapters;
mod drivers;
pub mod engine;
pub mod link;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{debug, info, warn};

use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogEventSink;
use app::service::MonitorService;
use config::TuningConfig;
use drivers::rgb_led::RgbLed;
use drivers::serial_link::SerialLink;
use events::Event;
use sensors::proximity::{self, BATCH_LEN};

/// Task watchdog window. The loop never blocks longer than one sampling
/// interval, so this leaves two orders of magnitude of headroom.
const WATCHDOG_TIMEOUT_MS: u32 = 5_000;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ProxiSense v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical: park in a sleep loop so
        // the IDLE task keeps running. Recovery is a power cycle.
        log::error!("HAL init failed: {} — halting", e);
        loop {
            #[cfg(target_os = "espidf")]
            esp_idf_hal::delay::FreeRtos::delay_ms(1_000);
            #[cfg(not(target_os = "espidf"))]
            std::thread::sleep(std::time::Duration::from_secs(1));
        }
    }
    info!(
        "Peripherals up: sense GPIO{} (ADC1), link UART{} @ {} baud",
        pins::PROXIMITY_ADC_GPIO,
        pins::LINK_UART_PORT,
        pins::LINK_BAUD_RATE
    );

    // ── 3. Tuning configuration ───────────────────────────────
    // Deployment builds may bake in a sparse JSON patch over the defaults,
    // e.g. PROXISENSE_TUNING='{"high_side_factor":2}' cargo build.
    let tuning = match option_env!("PROXISENSE_TUNING") {
        Some(patch) => TuningConfig::default().with_overrides(patch)?,
        None => TuningConfig::default(),
    };
    match serde_json::to_string(&tuning) {
        Ok(json) => info!("Tuning: {}", json),
        Err(e) => warn!("Tuning dump failed: {}", e),
    }

    // ── 4. Construct adapters ─────────────────────────────────
    let mut led = RgbLed::new();
    led.self_test();

    let mut hw = HardwareAdapter::new(led, SerialLink::new());
    let mut log_sink = LogEventSink::new();

    // ── 5. Construct the monitor service ──────────────────────
    let mut service = MonitorService::new(tuning.clone());

    // ── 6. Timers + watchdog ──────────────────────────────────
    drivers::hw_timer::start_timers(tuning.sample_interval_ms, tuning.stability_period_ms);
    let watchdog = drivers::watchdog::Watchdog::new(WATCHDOG_TIMEOUT_MS);

    info!("System ready. Entering event loop.");

    // ── 7. Event loop ─────────────────────────────────────────
    let mut batch = [0u16; BATCH_LEN];

    #[cfg(not(target_os = "espidf"))]
    let mut sim_elapsed_ms: u32 = 0;

    loop {
        // Simulate timer interrupts via sleep on non-espidf targets.
        // On real hardware the esp-timer dispatch task produces these
        // events and the loop blocks in the idle delay below.
        #[cfg(not(target_os = "espidf"))]
        {
            std::thread::sleep(std::time::Duration::from_millis(
                tuning.sample_interval_ms as u64,
            ));
            if proximity::sample_tick() {
                events::push_event(Event::SampleReady);
            }
            sim_elapsed_ms += tuning.sample_interval_ms;
            if sim_elapsed_ms >= tuning.stability_period_ms {
                events::push_event(Event::StabilityTick);
                sim_elapsed_ms = 0;
            }
        }

        // Process all pending events.
        events::drain_events(|event| match event {
            Event::SampleReady => {
                if proximity::take_batch(&mut batch) {
                    if let Err(e) = service.ingest_batch(&batch, &mut hw, &mut log_sink) {
                        debug!("ingest skipped: {}", e);
                    }
                }
            }

            Event::StabilityTick => {
                if let Err(e) = service.stability_tick(&mut log_sink) {
                    debug!("stability check skipped: {}", e);
                }
            }
        });

        // Inbound control codes from the peer.
        while let Some(code) = hw.poll_control() {
            service.on_control(code, &mut log_sink);
        }

        // Paced retry of a parked feedback frame.
        service.flush_pending(&mut hw, &mut log_sink);

        // Feed watchdog on every iteration.
        watchdog.feed();

        // Idle until roughly the next sampling tick.
        #[cfg(target_os = "espidf")]
        esp_idf_hal::delay::FreeRtos::delay_ms(tuning.sample_interval_ms);
    }
}
