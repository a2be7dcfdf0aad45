//! Mock hardware adapter for integration tests.
//!
//! Records every port call so tests can assert on the full command
//! history without touching real PWM/UART registers.

use proxisense::app::events::AppEvent;
use proxisense::app::ports::{EventSink, LightPort, LinkPort};
use proxisense::engine::feedback::IntensityTriple;
use proxisense::error::LinkError;
use proxisense::link::FeedbackFrame;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub lights: Vec<IntensityTriple>,
    pub frames: Vec<FeedbackFrame>,
    /// What `is_ready` reports; tests flip this to simulate a draining
    /// transmitter.
    pub ready: bool,
    /// When set, `send_frame` fails with this error instead of recording.
    pub fail_with: Option<LinkError>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            frames: Vec::new(),
            ready: true,
            fail_with: None,
        }
    }

    pub fn last_light(&self) -> Option<IntensityTriple> {
        self.lights.last().copied()
    }

    pub fn last_frame(&self) -> Option<FeedbackFrame> {
        self.frames.last().copied()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl LightPort for MockHardware {
    fn set_intensity(&mut self, triple: IntensityTriple) {
        self.lights.push(triple);
    }
}

impl LinkPort for MockHardware {
    fn is_ready(&mut self) -> bool {
        self.ready
    }

    fn send_frame(&mut self, frame: &FeedbackFrame) -> Result<(), LinkError> {
        if let Some(error) = self.fail_with {
            return Err(error);
        }
        self.frames.push(*frame);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
