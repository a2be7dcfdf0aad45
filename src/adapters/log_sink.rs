//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Snapshot events additionally render as CSV rows so the serial capture
//! can be pasted straight into a plotting tool.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Column header emitted once before the first snapshot row.
const CSV_HEADER: &str = "SENSOR, GOLDEN, STABLE, CURAVE, LOWREF, TOPREF";

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink {
    header_written: bool,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self {
            header_written: false,
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::SnapshotProcessed(snap) => {
                if !self.header_written {
                    info!("{}", CSV_HEADER);
                    self.header_written = true;
                }
                info!(
                    "{}, {}, {}, {}, {}, {}",
                    snap.reading,
                    snap.band.golden,
                    if snap.stable { "TRUE" } else { "FALSE" },
                    snap.average,
                    snap.band.low,
                    snap.band.top,
                );
            }
            AppEvent::CalibrationCompleted { band } => {
                info!(
                    "CALIB | complete, golden={} low={} top={}",
                    band.golden, band.low, band.top,
                );
            }
            AppEvent::BandRecalibrated { band } => {
                info!(
                    "CALIB | re-anchored, golden={} low={} top={}",
                    band.golden, band.low, band.top,
                );
            }
            AppEvent::StabilityLost { reading } => {
                info!("STAB | lost, reading={}", reading);
            }
            AppEvent::StabilityRestored => {
                info!("STAB | restored");
            }
            AppEvent::IntensityApplied(triple) => {
                debug!(
                    "LIGHT | r={} g={} b={}",
                    triple.red, triple.green, triple.blue,
                );
            }
            AppEvent::FrameSent { frame } => {
                debug!("LINK | frame sent {:02X?}", frame);
            }
            AppEvent::LinkBusy => {
                info!("LINK | busy, frame parked");
            }
            AppEvent::LinkFault { error } => {
                info!("LINK | fault: {}", error);
            }
            AppEvent::ControlReceived(code) => {
                info!("CTRL | {} received", code.mnemonic());
            }
        }
    }
}
