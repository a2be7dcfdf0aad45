//! Calibration and stability engine.
//!
//! The stateful core of the firmware: owns the sample history, anchors the
//! reference band, tracks the running average against its previous value,
//! and classifies the signal as stable or anomalous.
//!
//! ```text
//!   batches ──▶ ingest_batch ──▶ ring history ──▶ rescan stats ──▶ snapshot ──▶ observer
//!                                                      ▲
//!   stability timer ──▶ check_stability ───────────────┘ (derived fields only)
//! ```
//!
//! Lifecycle: the engine starts uncalibrated, accumulates one full window of
//! readings, then anchors the band once (`golden` at the window average,
//! `low`/`top` at the observed extremes padded by the margin). There is no
//! path back to the uncalibrated state short of a reset.
//!
//! The engine exclusively owns its history and snapshot. Consumers get the
//! snapshot by value, never by reference, so a torn update can never be
//! observed outside this module.

pub mod feedback;

use crate::config::TuningConfig;
use crate::error::SensorError;

/// Number of readings in the sample history window.
pub const WINDOW_SIZE: usize = 50;

/// Raw converter full scale (10-bit).
pub const ADC_FULL_SCALE: f32 = 1023.0;

/// Converter reference voltage used for diagnostic conversion only.
pub const REFERENCE_VOLTS: f32 = 0.6;

/// The accepted rest value and excursion bounds.
///
/// `low` and `top` are signed: the margin can push `low` below zero when the
/// signal rests near the bottom of the converter range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReferenceBand {
    /// Best current estimate of the at-rest reading.
    pub golden: i32,
    /// Lowest accepted excursion.
    pub low: i32,
    /// Highest accepted excursion.
    pub top: i32,
}

/// Externally observable engine state, rebuilt on every ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorSnapshot {
    /// Most recent reading (the window average right after calibration).
    pub reading: u16,
    /// Running average over the whole window.
    pub average: i32,
    /// Running average at the last accepted stability check.
    pub previous_average: i32,
    /// Current reference band.
    pub band: ReferenceBand,
    /// Verdict of the last stability check.
    pub stable: bool,
}

/// Receiver for freshly processed snapshots.
///
/// Invoked synchronously inside the ingestion call; implementations must not
/// block. Zero or one observer per call.
pub trait SnapshotObserver {
    fn on_snapshot(&mut self, snapshot: &SensorSnapshot);
}

/// Successful ingestion classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Still collecting the first window; `collected` readings so far.
    Accumulating { collected: usize },
    /// This batch completed the one-shot initial calibration.
    Calibrated,
    /// Steady-state: one reading ingested and the snapshot delivered.
    Processed,
}

/// Successful stability-check classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityVerdict {
    /// Reading at or beyond a band edge; marked unstable, band untouched.
    OutOfBand,
    /// In-band but the average is still moving beyond the threshold.
    Drifting,
    /// Converged; marked stable.
    Stable,
    /// Converged and the band was re-anchored around the current window.
    Recalibrated,
}

/// Windowed statistics produced by a full rescan.
#[derive(Debug, Clone, Copy)]
struct WindowStats {
    average: i32,
    min: u16,
    max: u16,
}

/// Owns the sample window and every derived statistic.
pub struct CalibrationEngine {
    history: [u16; WINDOW_SIZE],
    /// Next slot to overwrite; always in `[0, WINDOW_SIZE)`.
    cursor: usize,
    /// Readings collected so far while uncalibrated.
    fill: usize,
    calibrated: bool,
    /// Window extremes from the last rescan; inputs to re-anchoring.
    window_min: u16,
    window_max: u16,
    snapshot: SensorSnapshot,
    tuning: TuningConfig,
}

impl CalibrationEngine {
    pub fn new(tuning: TuningConfig) -> Self {
        Self {
            history: [0; WINDOW_SIZE],
            cursor: 0,
            fill: 0,
            calibrated: false,
            window_min: 0,
            window_max: 0,
            snapshot: SensorSnapshot::default(),
            tuning,
        }
    }

    /// One ingestion cycle.
    ///
    /// Uncalibrated: accumulates the batch into the history and runs the
    /// one-shot calibration once a full window has been collected (the
    /// observer is not consulted for that transition; the caller reads the
    /// snapshot instead).
    ///
    /// Calibrated: ingests the batch's first reading into the ring,
    /// rescans the window, widens the band if the reading escaped it, and
    /// hands the rebuilt snapshot to `observer`. Without an observer the
    /// snapshot is still updated but the call reports
    /// [`SensorError::ObserverMissing`].
    ///
    /// Empty batches and batches larger than the window are rejected
    /// before any state changes.
    pub fn ingest_batch(
        &mut self,
        batch: &[u16],
        observer: Option<&mut dyn SnapshotObserver>,
    ) -> Result<IngestOutcome, SensorError> {
        if batch.is_empty() {
            return Err(SensorError::EmptyBatch);
        }
        if batch.len() > WINDOW_SIZE {
            return Err(SensorError::BatchOverrun { len: batch.len() });
        }

        if !self.calibrated {
            return Ok(self.accumulate(batch));
        }

        let reading = batch[0];
        self.history[self.cursor] = reading;
        self.cursor = (self.cursor + 1) % WINDOW_SIZE;

        let stats = self.rescan();
        self.window_min = stats.min;
        self.window_max = stats.max;

        // Widen, never narrow: an escaped reading drags its bound along.
        let value = i32::from(reading);
        if value > self.snapshot.band.top {
            self.snapshot.band.top = value;
        }
        if value < self.snapshot.band.low {
            self.snapshot.band.low = value;
        }

        self.snapshot.reading = reading;
        self.snapshot.average = stats.average;

        match observer {
            Some(observer) => {
                observer.on_snapshot(&self.snapshot);
                Ok(IngestOutcome::Processed)
            }
            None => Err(SensorError::ObserverMissing),
        }
    }

    /// Periodic stability classification.
    ///
    /// Reads only derived fields, never the history, so its cadence is
    /// independent of ingestion. A reading at or beyond a band edge is
    /// anomalous even if its own ingestion widened the band onto it; the
    /// edge-inclusive compare keeps that excursion visible here.
    pub fn check_stability(&mut self) -> Result<StabilityVerdict, SensorError> {
        if !self.calibrated {
            return Err(SensorError::NotCalibrated);
        }

        let value = i32::from(self.snapshot.reading);
        if value <= self.snapshot.band.low || value >= self.snapshot.band.top {
            self.snapshot.stable = false;
            return Ok(StabilityVerdict::OutOfBand);
        }

        let drift = (self.snapshot.average - self.snapshot.previous_average).abs();
        if drift <= i32::from(self.tuning.stability_threshold) {
            self.snapshot.previous_average = self.snapshot.average;
            self.snapshot.stable = true;
            if self.tuning.auto_recalibrate {
                self.reanchor();
                return Ok(StabilityVerdict::Recalibrated);
            }
            return Ok(StabilityVerdict::Stable);
        }

        Ok(StabilityVerdict::Drifting)
    }

    /// Current snapshot, by value.
    pub fn snapshot(&self) -> SensorSnapshot {
        self.snapshot
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    fn accumulate(&mut self, batch: &[u16]) -> IngestOutcome {
        let room = WINDOW_SIZE - self.fill;
        let take = batch.len().min(room);
        self.history[self.fill..self.fill + take].copy_from_slice(&batch[..take]);
        self.fill += take;

        if self.fill < WINDOW_SIZE {
            return IngestOutcome::Accumulating {
                collected: self.fill,
            };
        }

        // Any surplus in the completing batch is discarded; the cadence
        // refills the window within one period.
        self.calibrate();
        IngestOutcome::Calibrated
    }

    /// One-shot anchoring over the first full window.
    fn calibrate(&mut self) {
        let stats = self.rescan();
        let average = stats.average;

        self.snapshot.average = average;
        self.snapshot.previous_average = average;
        self.snapshot.reading = average as u16;
        self.snapshot.band.golden = average;
        self.snapshot.band.low = Self::pad_low(stats.min, average, self.tuning.band_margin);
        self.snapshot.band.top = Self::pad_top(stats.max, average, self.tuning.band_margin);

        self.cursor = (self.cursor + 1) % WINDOW_SIZE;
        self.window_min = stats.min;
        self.window_max = stats.max;
        self.calibrated = true;
    }

    /// Re-anchor the band around the current reading and window extremes.
    fn reanchor(&mut self) {
        let average = self.snapshot.average;
        self.snapshot.band.golden = i32::from(self.snapshot.reading);
        self.snapshot.band.low = Self::pad_low(self.window_min, average, self.tuning.band_margin);
        self.snapshot.band.top = Self::pad_top(self.window_max, average, self.tuning.band_margin);
    }

    /// Full O(N) pass over the window. Deliberately not incremental: at
    /// this sample rate the rescan is cheap and keeps the statistics
    /// trivially consistent with the stored readings.
    fn rescan(&self) -> WindowStats {
        let mut total: i32 = 0;
        let mut min = u16::MAX;
        let mut max = 0u16;

        for &reading in &self.history {
            total += i32::from(reading);
            if reading < min {
                min = reading;
            }
            if reading > max {
                max = reading;
            }
        }

        WindowStats {
            average: total / WINDOW_SIZE as i32,
            min,
            max,
        }
    }

    fn pad_low(min: u16, average: i32, margin: f32) -> i32 {
        (f32::from(min) - margin * average as f32) as i32
    }

    fn pad_top(max: u16, average: i32, margin: f32) -> i32 {
        (f32::from(max) + margin * average as f32) as i32
    }
}

/// Diagnostic conversion of a raw reading to volts at the converter's
/// reference. Never feeds a control decision.
pub fn to_voltage(reading: u16) -> f32 {
    (f32::from(reading) / ADC_FULL_SCALE) * REFERENCE_VOLTS
}
