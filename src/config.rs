//! System configuration parameters
//!
//! All tunable parameters for the ProxiSense monitor. Compile-time facts
//! (window size, frame bytes, pin map) are constants in their own modules;
//! everything here is a deployment-tunable value.

use serde::{Deserialize, Serialize};

/// Core tuning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningConfig {
    // --- Stability ---
    /// Maximum drift (ADC counts) between consecutive running averages
    /// for the signal to count as stable. Also the feedback dead band.
    pub stability_threshold: u16,
    /// Fraction of the running average added around the observed min/max
    /// when anchoring the reference band.
    pub band_margin: f32,
    /// Re-anchor the reference band when the signal converges in-band.
    pub auto_recalibrate: bool,

    // --- Feedback ---
    /// High-side widening factor `k`: the green channel only engages above
    /// `golden + k * stability_threshold`. `1` keeps both sides symmetric.
    pub high_side_factor: u16,

    // --- Timing ---
    /// ADC sampling cadence (milliseconds per reading)
    pub sample_interval_ms: u32,
    /// Stability re-check period (milliseconds)
    pub stability_period_ms: u32,
}

impl TuningConfig {
    /// Apply a sparse JSON override object on top of this configuration.
    ///
    /// Deployment overrides arrive as partial objects; fields absent from
    /// the patch keep their current value.
    pub fn with_overrides(&self, patch: &str) -> Result<Self, serde_json::Error> {
        let mut base = serde_json::to_value(self)?;
        let patch: serde_json::Value = serde_json::from_str(patch)?;
        if let (Some(base), Some(patch)) = (base.as_object_mut(), patch.as_object()) {
            base.extend(patch.clone());
        }
        serde_json::from_value(base)
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            // Stability
            stability_threshold: 20,
            band_margin: 0.1,
            auto_recalibrate: true,

            // Feedback
            high_side_factor: 1,

            // Timing
            sample_interval_ms: 10,      // 100 Hz
            stability_period_ms: 10_000, // every 10 s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = TuningConfig::default();
        assert!(c.stability_threshold > 0);
        assert!(c.band_margin > 0.0 && c.band_margin < 1.0);
        assert!(c.high_side_factor >= 1);
        assert!(c.sample_interval_ms > 0);
        assert!(c.stability_period_ms > 0);
    }

    #[test]
    fn serde_roundtrip() {
        let c = TuningConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: TuningConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.stability_threshold, c2.stability_threshold);
        assert!((c.band_margin - c2.band_margin).abs() < 0.001);
        assert_eq!(c.auto_recalibrate, c2.auto_recalibrate);
        assert_eq!(c.high_side_factor, c2.high_side_factor);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = TuningConfig::default();
        assert!(
            c.sample_interval_ms < c.stability_period_ms,
            "sampling must outpace the stability re-check"
        );
        // A full window must fit between stability checks, otherwise the
        // running average can never settle before it is judged.
        let window = crate::engine::WINDOW_SIZE as u32;
        assert!(c.sample_interval_ms * window < c.stability_period_ms);
    }

    #[test]
    fn partial_json_overrides_merge_over_defaults() {
        // Deployment overrides arrive as sparse JSON objects merged over
        // the defaults before deserialisation.
        let json = r#"{ "stability_threshold": 12, "high_side_factor": 2 }"#;
        let patched = TuningConfig::default().with_overrides(json).unwrap();
        assert_eq!(patched.stability_threshold, 12);
        assert_eq!(patched.high_side_factor, 2);
        assert!(patched.auto_recalibrate, "untouched field keeps default");
    }

    #[test]
    fn malformed_override_is_rejected() {
        assert!(TuningConfig::default().with_overrides("not json").is_err());
    }
}
