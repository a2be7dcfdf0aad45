//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them — format a log line, record
//! them in a test, etc.

use crate::engine::feedback::IntensityTriple;
use crate::engine::{ReferenceBand, SensorSnapshot};
use crate::error::LinkError;
use crate::link::{ControlCode, FeedbackFrame};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The first full window was collected and the band anchored.
    CalibrationCompleted { band: ReferenceBand },

    /// One ingestion cycle finished; carries the fresh snapshot.
    SnapshotProcessed(SensorSnapshot),

    /// A stability check classified the signal as out of band.
    StabilityLost { reading: u16 },

    /// The signal settled again after an unstable stretch.
    StabilityRestored,

    /// Convergence re-anchored the reference band.
    BandRecalibrated { band: ReferenceBand },

    /// The intensity applied to the light this cycle.
    IntensityApplied(IntensityTriple),

    /// A feedback frame left through the serial port.
    FrameSent { frame: FeedbackFrame },

    /// Transmitter busy; the frame is parked for a paced retry.
    LinkBusy,

    /// The serial driver rejected a frame outright.
    LinkFault { error: LinkError },

    /// The peer answered with a control code.
    ControlReceived(ControlCode),
}
