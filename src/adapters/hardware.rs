//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`RgbLed`] and [`SerialLink`] drivers, exposing them
//! through [`LightPort`] and [`LinkPort`].  This is the only module
//! in the system that touches actual output hardware.  On non-espidf
//! targets, the underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{LightPort, LinkPort};
use crate::drivers::rgb_led::RgbLed;
use crate::drivers::serial_link::SerialLink;
use crate::engine::feedback::IntensityTriple;
use crate::error::LinkError;
use crate::link::{ControlCode, FeedbackFrame};

/// Concrete adapter that combines all output hardware behind port traits.
pub struct HardwareAdapter {
    led: RgbLed,
    link: SerialLink,
}

impl HardwareAdapter {
    pub fn new(led: RgbLed, link: SerialLink) -> Self {
        Self { led, link }
    }

    /// Drains one inbound control byte from the link, if any arrived.
    ///
    /// Not part of a port trait: only the main loop polls the receive
    /// side, and it does so directly on the adapter.
    pub fn poll_control(&mut self) -> Option<ControlCode> {
        self.link.poll_control()
    }
}

// ── LightPort implementation ──────────────────────────────────

impl LightPort for HardwareAdapter {
    fn set_intensity(&mut self, triple: IntensityTriple) {
        self.led.apply(triple);
    }
}

// ── LinkPort implementation ───────────────────────────────────

impl LinkPort for HardwareAdapter {
    fn is_ready(&mut self) -> bool {
        self.link.is_ready()
    }

    fn send_frame(&mut self, frame: &FeedbackFrame) -> Result<(), LinkError> {
        self.link.send_frame(frame)
    }
}
