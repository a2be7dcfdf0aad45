//! Proportional feedback mapping.
//!
//! Stateless translation of a [`SensorSnapshot`] into a tri-color intensity
//! triple. Recomputed from scratch every ingestion cycle; nothing here
//! remembers the previous output.

use crate::config::TuningConfig;
use crate::engine::SensorSnapshot;

/// Top of the 8-bit intensity range.
pub const MAX_INTENSITY: u8 = 255;

/// One PWM duty per color channel. The mapper drives blue below the band
/// and green above it; red stays dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntensityTriple {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl IntensityTriple {
    pub const OFF: Self = Self {
        red: 0,
        green: 0,
        blue: 0,
    };

    pub fn is_off(&self) -> bool {
        *self == Self::OFF
    }
}

/// Map a snapshot to channel intensities.
///
/// Inside the dead band (`|reading - golden| <= threshold`) everything is
/// dark. Below it, blue runs from full brightness at `low` down to zero at
/// the dead-band edge. Above `golden + high_side_factor * threshold`, green
/// runs from zero at the dead-band edge up to full brightness at `top`.
/// A `high_side_factor` above one opens a dark gap between the dead band
/// and the green ramp.
pub fn map_feedback(snapshot: &SensorSnapshot, tuning: &TuningConfig) -> IntensityTriple {
    let reading = i32::from(snapshot.reading);
    let golden = snapshot.band.golden;
    let threshold = i32::from(tuning.stability_threshold);

    if (reading - golden).abs() <= threshold {
        return IntensityTriple::OFF;
    }

    if reading < golden - threshold {
        let blue = scale_intensity(
            reading,
            snapshot.band.low,
            golden - threshold,
            MAX_INTENSITY,
            0,
        );
        return IntensityTriple {
            red: 0,
            green: 0,
            blue,
        };
    }

    let gate = golden + i32::from(tuning.high_side_factor) * threshold;
    if reading > gate {
        let green = scale_intensity(
            reading,
            golden + threshold,
            snapshot.band.top,
            0,
            MAX_INTENSITY,
        );
        return IntensityTriple {
            red: 0,
            green,
            blue: 0,
        };
    }

    // Desensitized zone between the dead band and the high-side gate.
    IntensityTriple::OFF
}

/// Linear map of `value` from `[in_min, in_max]` onto `[out_min, out_max]`,
/// clamping the input first so the output never leaves the target range.
/// A collapsed input domain resolves to whichever end the value sits on.
fn scale_intensity(value: i32, in_min: i32, in_max: i32, out_min: u8, out_max: u8) -> u8 {
    if in_max <= in_min {
        return if value <= in_min { out_min } else { out_max };
    }
    let clamped = value.clamp(in_min, in_max);
    let out_lo = i32::from(out_min);
    let out_hi = i32::from(out_max);
    let scaled = (clamped - in_min) * (out_hi - out_lo) / (in_max - in_min) + out_lo;
    scaled as u8
}
