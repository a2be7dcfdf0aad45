//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   MonitorService (domain) ──▶ Port trait ──▶ Adapter
//! ```
//!
//! Driven adapters (light, serial link, event sinks) implement these traits.
//! The [`MonitorService`](super::service::MonitorService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::engine::feedback::IntensityTriple;
use crate::error::LinkError;
use crate::link::FeedbackFrame;

// ───────────────────────────────────────────────────────────────
// Light port (driven adapter: domain → PWM channels)
// ───────────────────────────────────────────────────────────────

/// Write-side port: proportional feedback on the tri-color light.
pub trait LightPort {
    /// Apply channel intensities. Fire-and-forget, no acknowledgement.
    fn set_intensity(&mut self, triple: IntensityTriple);
}

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: domain → serial transport)
// ───────────────────────────────────────────────────────────────

/// Write-side port: framed feedback over the serial channel.
///
/// The domain only offers frames while [`is_ready`](LinkPort::is_ready)
/// reports the transmitter idle; a busy transport is parked-and-retried,
/// never treated as fatal.
pub trait LinkPort {
    /// Whether the transmitter can accept a frame right now.
    fn is_ready(&mut self) -> bool;

    /// Hand one frame to the transmitter.
    fn send_frame(&mut self, frame: &FeedbackFrame) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, a test
/// recorder, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
