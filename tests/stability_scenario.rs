//! End-to-end session walkthrough: calibrate → excursion → recovery.
//!
//! Drives the full MonitorService pipeline through an entire monitoring
//! session the way the firmware's main loop would, checking the band,
//! the verdicts and every outbound effect at each phase.

use proxisense::app::events::AppEvent;
use proxisense::app::ports::{EventSink, LightPort, LinkPort};
use proxisense::app::service::MonitorService;
use proxisense::config::TuningConfig;
use proxisense::engine::feedback::IntensityTriple;
use proxisense::engine::{StabilityVerdict, WINDOW_SIZE};
use proxisense::error::LinkError;
use proxisense::link::FeedbackFrame;

// ── Minimal capturing adapters ────────────────────────────────

struct CapturingHw {
    ready: bool,
    lights: Vec<IntensityTriple>,
    frames: Vec<FeedbackFrame>,
}

impl CapturingHw {
    fn new() -> Self {
        Self {
            ready: true,
            lights: Vec::new(),
            frames: Vec::new(),
        }
    }
}

impl LightPort for CapturingHw {
    fn set_intensity(&mut self, triple: IntensityTriple) {
        self.lights.push(triple);
    }
}

impl LinkPort for CapturingHw {
    fn is_ready(&mut self) -> bool {
        self.ready
    }

    fn send_frame(&mut self, frame: &FeedbackFrame) -> Result<(), LinkError> {
        if !self.ready {
            return Err(LinkError::Busy);
        }
        self.frames.push(*frame);
        Ok(())
    }
}

struct TraceSink {
    events: Vec<AppEvent>,
}

impl TraceSink {
    fn new() -> Self {
        Self { events: Vec::new() }
    }

    fn count_lost(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::StabilityLost { .. }))
            .count()
    }

    fn count_restored(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::StabilityRestored))
            .count()
    }
}

impl EventSink for TraceSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Full session ──────────────────────────────────────────────

#[test]
fn full_session_calibrate_excursion_recover() {
    let mut service = MonitorService::new(TuningConfig::default());
    let mut hw = CapturingHw::new();
    let mut sink = TraceSink::new();

    // Phase 1: the first full window anchors the band.
    let window = [400u16; WINDOW_SIZE];
    service.ingest_batch(&window, &mut hw, &mut sink).unwrap();
    let band = service.snapshot().band;
    assert_eq!((band.golden, band.low, band.top), (400, 360, 440));
    assert!(hw.lights.is_empty(), "calibration drives no output");

    // First stability check: the signal has not moved, so it settles
    // immediately and the band re-anchors onto itself.
    assert_eq!(
        service.stability_tick(&mut sink),
        Ok(StabilityVerdict::Recalibrated)
    );
    assert!(service.snapshot().stable);
    let band = service.snapshot().band;
    assert_eq!((band.golden, band.low, band.top), (400, 360, 440));

    // Phase 2: a hard excursion to 300 drags the low bound with it and
    // saturates the blue channel.
    service.ingest_batch(&[300], &mut hw, &mut sink).unwrap();
    assert_eq!(service.snapshot().band.low, 300);
    assert_eq!(service.snapshot().average, 398);
    assert_eq!(hw.frames.last(), Some(&[0xAA, 0, 0, 255, 255, 0x55]));

    // The next check flags it: the reading sits on the widened edge.
    assert_eq!(
        service.stability_tick(&mut sink),
        Ok(StabilityVerdict::OutOfBand)
    );
    assert!(!service.snapshot().stable);
    assert_eq!(sink.count_lost(), 1);

    // Phase 3: the signal returns to rest; output goes dark again.
    service.ingest_batch(&[400], &mut hw, &mut sink).unwrap();
    assert_eq!(hw.frames.last(), Some(&[0xAA, 0, 0, 0, 0, 0x55]));
    assert!(hw.lights.last().unwrap().is_off());

    // The following check restores stability and re-anchors around the
    // current window (which still remembers the 300 excursion).
    assert_eq!(
        service.stability_tick(&mut sink),
        Ok(StabilityVerdict::Recalibrated)
    );
    let snap = service.snapshot();
    assert!(snap.stable);
    assert_eq!(snap.band.golden, 400);
    assert_eq!(snap.band.low, 260, "low pads the remembered excursion");
    assert_eq!(snap.band.top, 439);

    assert_eq!(sink.count_lost(), 1);
    assert_eq!(
        sink.count_restored(),
        2,
        "restored on first settle and again after the excursion"
    );
}

// ── Busy transmitter behaviour across a session ───────────────

#[test]
fn busy_transmitter_parks_and_newest_frame_supersedes() {
    let mut service = MonitorService::new(TuningConfig::default());
    let mut hw = CapturingHw::new();
    let mut sink = TraceSink::new();

    let window = [400u16; WINDOW_SIZE];
    service.ingest_batch(&window, &mut hw, &mut sink).unwrap();

    // Two cycles against a busy transmitter: each parks its frame, the
    // second replacing the first.
    hw.ready = false;
    service.ingest_batch(&[300], &mut hw, &mut sink).unwrap();
    service.ingest_batch(&[310], &mut hw, &mut sink).unwrap();

    assert!(service.has_pending_frame());
    assert!(hw.frames.is_empty());
    assert_eq!(
        sink.events
            .iter()
            .filter(|e| matches!(e, AppEvent::LinkBusy))
            .count(),
        2
    );

    // A flush against the still-busy port just keeps waiting.
    service.flush_pending(&mut hw, &mut sink);
    assert!(service.has_pending_frame());
    assert_eq!(service.busy_retries(), 3);

    // Once the transmitter drains, only the newest frame goes out.
    hw.ready = true;
    service.flush_pending(&mut hw, &mut sink);
    assert!(!service.has_pending_frame());
    assert_eq!(service.busy_retries(), 0);
    assert_eq!(hw.frames, vec![[0xAA, 0, 0, 224, 224, 0x55]]);
    assert!(sink.events.contains(&AppEvent::FrameSent {
        frame: [0xAA, 0, 0, 224, 224, 0x55]
    }));
}
