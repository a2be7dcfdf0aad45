//! Fuzz target: `map_feedback`
//!
//! Builds snapshots and tuning values from raw fuzz bytes, spanning the
//! whole domain the engine can produce (readings up to 10 bits, bands
//! widened well past the ADC range), and asserts the mapper output.
//!
//! Invariants checked:
//! - No panics for any in-domain snapshot/tuning combination
//! - Red never lights
//! - Blue and green never light together
//! - The dead band is always dark
//!
//! cargo fuzz run fuzz_feedback_map

#![no_main]

use libfuzzer_sys::fuzz_target;
use proxisense::config::TuningConfig;
use proxisense::engine::feedback::map_feedback;
use proxisense::engine::{ReferenceBand, SensorSnapshot};

fuzz_target!(|data: &[u8]| {
    if data.len() < 10 {
        return;
    }

    let reading = u16::from_le_bytes([data[0], data[1]]) & 0x3FF;
    let golden = i32::from(u16::from_le_bytes([data[2], data[3]]) & 0x3FF);
    let below = i32::from(u16::from_le_bytes([data[4], data[5]]) & 0x7FF);
    let above = i32::from(u16::from_le_bytes([data[6], data[7]]) & 0x7FF);
    let threshold = u16::from(data[8] & 0x7F) + 1;
    let factor = u16::from(data[9] & 0x03) + 1;

    let tuning = TuningConfig {
        stability_threshold: threshold,
        high_side_factor: factor,
        ..TuningConfig::default()
    };
    let snapshot = SensorSnapshot {
        reading,
        average: golden,
        previous_average: golden,
        band: ReferenceBand {
            golden,
            low: golden - below,
            top: golden + above,
        },
        stable: false,
    };

    let triple = map_feedback(&snapshot, &tuning);

    assert_eq!(triple.red, 0, "red channel is never driven");
    assert!(
        !(triple.green > 0 && triple.blue > 0),
        "at most one channel lights at a time"
    );
    if (i32::from(reading) - golden).abs() <= i32::from(threshold) {
        assert!(triple.is_off(), "dead band must stay dark");
    }
});
