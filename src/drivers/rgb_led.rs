//! Tri-color feedback light driver.
//!
//! Three LEDC PWM channels (CH0-2) drive discrete R/G/B LEDs (or a
//! common-cathode RGB LED). Duty is 8-bit, one-to-one with the intensity
//! triple the mapper produces.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives three LEDC PWM channels via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::engine::feedback::{IntensityTriple, MAX_INTENSITY};

/// Dwell per channel during the power-on sweep.
const SELF_TEST_STEP_MS: u32 = 1_000;

pub struct RgbLed {
    current: IntensityTriple,
}

impl RgbLed {
    pub fn new() -> Self {
        Self {
            current: IntensityTriple::OFF,
        }
    }

    pub fn apply(&mut self, triple: IntensityTriple) {
        hw_init::ledc_set(hw_init::LEDC_CH_LED_R, triple.red);
        hw_init::ledc_set(hw_init::LEDC_CH_LED_G, triple.green);
        hw_init::ledc_set(hw_init::LEDC_CH_LED_B, triple.blue);
        self.current = triple;
    }

    pub fn off(&mut self) {
        self.apply(IntensityTriple::OFF);
    }

    pub fn current(&self) -> IntensityTriple {
        self.current
    }

    /// Power-on sweep: each channel alone at full brightness, then dark.
    /// Lets the assembler verify all three channels before readings flow.
    pub fn self_test(&mut self) {
        let steps = [
            IntensityTriple {
                red: MAX_INTENSITY,
                green: 0,
                blue: 0,
            },
            IntensityTriple {
                red: 0,
                green: MAX_INTENSITY,
                blue: 0,
            },
            IntensityTriple {
                red: 0,
                green: 0,
                blue: MAX_INTENSITY,
            },
        ];
        for triple in steps {
            self.apply(triple);
            delay_ms(SELF_TEST_STEP_MS);
        }
        self.off();
    }
}

#[cfg(target_os = "espidf")]
fn delay_ms(ms: u32) {
    esp_idf_hal::delay::FreeRtos::delay_ms(ms);
}

#[cfg(not(target_os = "espidf"))]
fn delay_ms(_ms: u32) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_tracks_last_triple() {
        let mut led = RgbLed::new();
        assert!(led.current().is_off());

        let triple = IntensityTriple {
            red: 0,
            green: 0,
            blue: 200,
        };
        led.apply(triple);
        assert_eq!(led.current(), triple);

        led.off();
        assert!(led.current().is_off());
    }

    #[test]
    fn self_test_ends_dark() {
        let mut led = RgbLed::new();
        led.self_test();
        assert!(led.current().is_off());
    }
}
