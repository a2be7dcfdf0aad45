//! Application service — the hexagonal core.
//!
//! [`MonitorService`] owns the calibration engine and the outbound frame
//! state.  It exposes a clean, hardware-agnostic API.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  ReadingBatch ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                   │     MonitorService      │
//!  LightPort    ◀── │  Engine · Map · Frames  │ ──▶ LinkPort
//!                   └────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::TuningConfig;
use crate::engine::feedback::map_feedback;
use crate::engine::{
    CalibrationEngine, IngestOutcome, SensorSnapshot, SnapshotObserver, StabilityVerdict,
};
use crate::error::{LinkError, SensorError};
use crate::link::{ControlCode, FeedbackFrame, encode_feedback};

use super::events::AppEvent;
use super::ports::{EventSink, LightPort, LinkPort};

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// Orchestrates one calibration engine and its feedback outputs.
pub struct MonitorService {
    engine: CalibrationEngine,
    tuning: TuningConfig,
    /// Frame waiting on a busy transmitter; retried from the main loop.
    pending_frame: Option<FeedbackFrame>,
    /// Busy polls since the last successful transmission.
    busy_retries: u32,
}

impl MonitorService {
    pub fn new(tuning: TuningConfig) -> Self {
        Self {
            engine: CalibrationEngine::new(tuning.clone()),
            tuning,
            pending_frame: None,
            busy_retries: 0,
        }
    }

    // ── Ingestion ─────────────────────────────────────────────

    /// Run one ingestion cycle on a fresh reading batch.
    ///
    /// The `hw` parameter satisfies **both** [`LightPort`] and
    /// [`LinkPort`] — this avoids a double mutable borrow while keeping
    /// the port boundary explicit. While uncalibrated the batch only
    /// accumulates; the cycle that completes the window anchors the band
    /// and reports it, without driving the actuators.
    pub fn ingest_batch(
        &mut self,
        batch: &[u16],
        hw: &mut (impl LightPort + LinkPort),
        sink: &mut impl EventSink,
    ) -> Result<(), SensorError> {
        let Self {
            engine,
            tuning,
            pending_frame,
            busy_retries,
        } = self;

        let mut fanout = FeedbackFanout {
            tuning,
            hw: &mut *hw,
            sink: &mut *sink,
            pending_frame,
            busy_retries,
        };

        match engine.ingest_batch(batch, Some(&mut fanout)) {
            Ok(IngestOutcome::Processed) => Ok(()),
            Ok(IngestOutcome::Accumulating { collected }) => {
                debug!("calibration window: {} readings collected", collected);
                Ok(())
            }
            Ok(IngestOutcome::Calibrated) => {
                let snapshot = engine.snapshot();
                info!(
                    "calibration anchored: golden={} low={} top={}",
                    snapshot.band.golden, snapshot.band.low, snapshot.band.top
                );
                sink.emit(&AppEvent::SnapshotProcessed(snapshot));
                sink.emit(&AppEvent::CalibrationCompleted {
                    band: snapshot.band,
                });
                Ok(())
            }
            Err(err) => {
                warn!("batch rejected: {}", err);
                Err(err)
            }
        }
    }

    // ── Stability ─────────────────────────────────────────────

    /// Run the periodic stability classification and report transitions.
    ///
    /// Before calibration completes this surfaces
    /// [`SensorError::NotCalibrated`]; the caller logs and moves on.
    pub fn stability_tick(
        &mut self,
        sink: &mut impl EventSink,
    ) -> Result<StabilityVerdict, SensorError> {
        let was_stable = self.engine.snapshot().stable;
        let verdict = self.engine.check_stability()?;
        let snapshot = self.engine.snapshot();

        match verdict {
            StabilityVerdict::OutOfBand => {
                if was_stable {
                    warn!("signal left the band: reading={}", snapshot.reading);
                    sink.emit(&AppEvent::StabilityLost {
                        reading: snapshot.reading,
                    });
                } else {
                    debug!("signal still out of band: reading={}", snapshot.reading);
                }
            }
            StabilityVerdict::Drifting => {
                debug!(
                    "average still moving: {} -> {}",
                    snapshot.previous_average, snapshot.average
                );
            }
            StabilityVerdict::Stable => {
                if !was_stable {
                    info!("signal settled at average {}", snapshot.average);
                    sink.emit(&AppEvent::StabilityRestored);
                }
            }
            StabilityVerdict::Recalibrated => {
                if !was_stable {
                    info!("signal settled at average {}", snapshot.average);
                    sink.emit(&AppEvent::StabilityRestored);
                }
                info!(
                    "band re-anchored: golden={} low={} top={}",
                    snapshot.band.golden, snapshot.band.low, snapshot.band.top
                );
                sink.emit(&AppEvent::BandRecalibrated {
                    band: snapshot.band,
                });
            }
        }

        Ok(verdict)
    }

    // ── Link upkeep ───────────────────────────────────────────

    /// Retry a parked frame. Called from the main loop, so the brief
    /// backoff between attempts comes from the loop's idle wait.
    pub fn flush_pending(&mut self, hw: &mut impl LinkPort, sink: &mut impl EventSink) {
        let Some(frame) = self.pending_frame.take() else {
            return;
        };

        if !hw.is_ready() {
            self.busy_retries += 1;
            self.pending_frame = Some(frame);
            return;
        }

        match hw.send_frame(&frame) {
            Ok(()) => {
                debug!("parked frame flushed after {} busy polls", self.busy_retries);
                self.busy_retries = 0;
                sink.emit(&AppEvent::FrameSent { frame });
            }
            Err(LinkError::Busy) => {
                self.busy_retries += 1;
                self.pending_frame = Some(frame);
            }
            Err(error) => {
                warn!("serial send failed: {}", error);
                sink.emit(&AppEvent::LinkFault { error });
            }
        }
    }

    /// Record a control code from the peer. Diagnostic only; the codes
    /// carry no control semantics today.
    pub fn on_control(&mut self, code: ControlCode, sink: &mut impl EventSink) {
        debug!("peer answered {}", code.mnemonic());
        sink.emit(&AppEvent::ControlReceived(code));
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current engine snapshot, by value.
    pub fn snapshot(&self) -> SensorSnapshot {
        self.engine.snapshot()
    }

    pub fn is_calibrated(&self) -> bool {
        self.engine.is_calibrated()
    }

    /// Whether a frame is still waiting on the transmitter.
    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Busy polls since the last successful transmission.
    pub fn busy_retries(&self) -> u32 {
        self.busy_retries
    }
}

// ───────────────────────────────────────────────────────────────
// Snapshot fan-out
// ───────────────────────────────────────────────────────────────

/// Observer handed to the engine for the duration of one ingestion call.
/// Fans a fresh snapshot out to the event sink, the light, and the link.
struct FeedbackFanout<'a, H, S> {
    tuning: &'a TuningConfig,
    hw: &'a mut H,
    sink: &'a mut S,
    pending_frame: &'a mut Option<FeedbackFrame>,
    busy_retries: &'a mut u32,
}

impl<H: LightPort + LinkPort, S: EventSink> SnapshotObserver for FeedbackFanout<'_, H, S> {
    fn on_snapshot(&mut self, snapshot: &SensorSnapshot) {
        self.sink.emit(&AppEvent::SnapshotProcessed(*snapshot));

        let triple = map_feedback(snapshot, self.tuning);
        self.hw.set_intensity(triple);
        self.sink.emit(&AppEvent::IntensityApplied(triple));

        let frame = encode_feedback(triple);
        offer_frame(
            self.hw,
            self.sink,
            self.pending_frame,
            self.busy_retries,
            frame,
        );
    }
}

/// First transmission attempt for a fresh frame. A busy transmitter parks
/// the frame instead of dropping it; a newer frame supersedes an older
/// parked one, since stale intensity is worthless by the next cycle.
fn offer_frame<H: LinkPort, S: EventSink>(
    hw: &mut H,
    sink: &mut S,
    pending_frame: &mut Option<FeedbackFrame>,
    busy_retries: &mut u32,
    frame: FeedbackFrame,
) {
    if !hw.is_ready() {
        if pending_frame.replace(frame).is_some() {
            debug!("superseding a frame still waiting on the transmitter");
        }
        *busy_retries += 1;
        warn!("serial link busy; frame parked for retry");
        sink.emit(&AppEvent::LinkBusy);
        return;
    }

    match hw.send_frame(&frame) {
        Ok(()) => {
            *busy_retries = 0;
            sink.emit(&AppEvent::FrameSent { frame });
        }
        Err(LinkError::Busy) => {
            *pending_frame = Some(frame);
            *busy_retries += 1;
            warn!("serial link busy; frame parked for retry");
            sink.emit(&AppEvent::LinkBusy);
        }
        Err(error) => {
            warn!("serial send failed: {}", error);
            sink.emit(&AppEvent::LinkFault { error });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::WINDOW_SIZE;

    struct RecordingSink {
        events: Vec<AppEvent>,
    }

    impl EventSink for RecordingSink {
        fn emit(&mut self, event: &AppEvent) {
            self.events.push(*event);
        }
    }

    struct StubHw {
        ready: bool,
        sent: Vec<FeedbackFrame>,
    }

    impl LightPort for StubHw {
        fn set_intensity(&mut self, _triple: crate::engine::feedback::IntensityTriple) {}
    }

    impl LinkPort for StubHw {
        fn is_ready(&mut self) -> bool {
            self.ready
        }

        fn send_frame(&mut self, frame: &FeedbackFrame) -> Result<(), LinkError> {
            self.sent.push(*frame);
            Ok(())
        }
    }

    #[test]
    fn busy_link_parks_frame_until_flush() {
        let mut service = MonitorService::new(TuningConfig::default());
        let mut hw = StubHw {
            ready: false,
            sent: Vec::new(),
        };
        let mut sink = RecordingSink { events: Vec::new() };

        let window = [400u16; WINDOW_SIZE];
        service.ingest_batch(&window, &mut hw, &mut sink).unwrap();
        service.ingest_batch(&[300], &mut hw, &mut sink).unwrap();

        assert!(hw.sent.is_empty());
        assert!(service.has_pending_frame());
        assert!(sink.events.contains(&AppEvent::LinkBusy));

        // Transmitter still busy: the frame stays parked.
        service.flush_pending(&mut hw, &mut sink);
        assert!(service.has_pending_frame());

        // Transmitter drains: the parked frame goes out unchanged.
        hw.ready = true;
        service.flush_pending(&mut hw, &mut sink);
        assert!(!service.has_pending_frame());
        assert_eq!(hw.sent.len(), 1);
        assert_eq!(hw.sent[0][0], 0xAA);
        assert_eq!(service.busy_retries(), 0);
    }

    #[test]
    fn stability_lost_emitted_once_per_transition() {
        let mut service = MonitorService::new(TuningConfig::default());
        let mut hw = StubHw {
            ready: true,
            sent: Vec::new(),
        };
        let mut sink = RecordingSink { events: Vec::new() };

        let window = [400u16; WINDOW_SIZE];
        service.ingest_batch(&window, &mut hw, &mut sink).unwrap();
        service.stability_tick(&mut sink).unwrap();
        assert!(service.snapshot().stable);

        // An excursion drags the low bound onto the reading; every check
        // while it sits there is out of band, but only the first one is
        // a transition worth reporting.
        service.ingest_batch(&[300], &mut hw, &mut sink).unwrap();
        for _ in 0..3 {
            assert_eq!(
                service.stability_tick(&mut sink),
                Ok(StabilityVerdict::OutOfBand)
            );
        }

        let lost = sink
            .events
            .iter()
            .filter(|e| matches!(e, AppEvent::StabilityLost { .. }))
            .count();
        assert_eq!(lost, 1);
    }
}
