//! Fuzz target: `CalibrationEngine::ingest_batch` / `check_stability`
//!
//! Drives arbitrary reading sequences, batch boundaries and interleaved
//! stability checks through the engine and asserts its structural
//! invariants after every call.
//!
//! Invariants checked:
//! - No panics under any input sequence
//! - Once calibrated, `low <= golden <= top` holds after every operation
//! - The band always covers the most recent reading
//! - `check_stability` never errors once calibration completed
//!
//! cargo fuzz run fuzz_engine_ingest

#![no_main]

use libfuzzer_sys::fuzz_target;
use proxisense::config::TuningConfig;
use proxisense::engine::CalibrationEngine;

fuzz_target!(|data: &[u8]| {
    let mut engine = CalibrationEngine::new(TuningConfig::default());

    // Empty batches are rejected in every state.
    assert!(engine.ingest_batch(&[], None).is_err());

    // Reassemble the fuzz bytes into 10-bit readings.
    let readings: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]) & 0x3FF)
        .collect();
    if readings.is_empty() {
        return;
    }

    // Split the stream into batches, reusing the leading reading as a
    // cheap length source. Lengths above the window size are kept so the
    // rejection path gets exercised too.
    let mut rest = readings.as_slice();
    while !rest.is_empty() {
        let len = (usize::from(rest[0]) % 64).clamp(1, rest.len());
        let (batch, tail) = rest.split_at(len);
        rest = tail;

        let _ = engine.ingest_batch(batch, None);

        if engine.is_calibrated() {
            let snap = engine.snapshot();
            assert!(snap.band.low <= snap.band.golden);
            assert!(snap.band.golden <= snap.band.top);
            assert!(snap.band.low <= i32::from(snap.reading));
            assert!(i32::from(snap.reading) <= snap.band.top);

            assert!(engine.check_stability().is_ok());
        }
    }

    // A check may have re-anchored the band; the bracket must survive it.
    if engine.is_calibrated() {
        let band = engine.snapshot().band;
        assert!(band.low <= band.golden && band.golden <= band.top);
    }
});
