//! Integration tests for the MonitorService → engine → ports pipeline.
//!
//! These run on the host (x86_64) and verify that a reading batch flows
//! through calibration, feedback mapping, the light port and the serial
//! link without any real hardware.

use crate::mock_hw::{MockHardware, RecordingSink};

use proxisense::app::events::AppEvent;
use proxisense::app::service::MonitorService;
use proxisense::config::TuningConfig;
use proxisense::engine::WINDOW_SIZE;
use proxisense::error::{LinkError, SensorError};
use proxisense::link::ControlCode;

fn make_service() -> (MonitorService, MockHardware, RecordingSink) {
    (
        MonitorService::new(TuningConfig::default()),
        MockHardware::new(),
        RecordingSink::new(),
    )
}

/// Feed one uniform window of 400s: anchors at golden=400, low=360, top=440.
fn calibrate(service: &mut MonitorService, hw: &mut MockHardware, sink: &mut RecordingSink) {
    let window = [400u16; WINDOW_SIZE];
    service
        .ingest_batch(&window, hw, sink)
        .expect("calibration window must be accepted");
    assert!(service.is_calibrated());
}

// ── Calibration cycle ─────────────────────────────────────────

#[test]
fn calibration_reports_band_without_actuation() {
    let (mut service, mut hw, mut sink) = make_service();
    calibrate(&mut service, &mut hw, &mut sink);

    let snapshot = service.snapshot();
    assert_eq!(snapshot.band.golden, 400);
    assert_eq!(snapshot.band.low, 360);
    assert_eq!(snapshot.band.top, 440);

    assert_eq!(
        sink.events,
        vec![
            AppEvent::SnapshotProcessed(snapshot),
            AppEvent::CalibrationCompleted {
                band: snapshot.band
            },
        ],
        "calibration reports exactly one snapshot and the anchored band"
    );
    assert!(hw.lights.is_empty(), "no light output before steady state");
    assert!(hw.frames.is_empty(), "no frames before steady state");
}

#[test]
fn accumulating_batches_stay_silent_and_surplus_is_discarded() {
    let (mut service, mut hw, mut sink) = make_service();

    let half = [400u16; WINDOW_SIZE / 2];
    service.ingest_batch(&half, &mut hw, &mut sink).unwrap();
    assert!(!service.is_calibrated());
    assert!(sink.events.is_empty(), "accumulation emits nothing");

    // 25 collected + 30 offered: the batch completes the window and the
    // surplus five readings are dropped.
    let over = [400u16; WINDOW_SIZE / 2 + 5];
    service.ingest_batch(&over, &mut hw, &mut sink).unwrap();
    assert!(service.is_calibrated());
    assert_eq!(sink.events.len(), 2);
}

// ── Steady-state feedback ─────────────────────────────────────

#[test]
fn dead_band_cycle_applies_dark_output() {
    let (mut service, mut hw, mut sink) = make_service();
    calibrate(&mut service, &mut hw, &mut sink);
    sink.events.clear();

    let batch = [405u16; WINDOW_SIZE];
    service.ingest_batch(&batch, &mut hw, &mut sink).unwrap();

    let light = hw.last_light().expect("light driven every steady cycle");
    assert!(light.is_off(), "in the dead band everything stays dark");
    assert_eq!(hw.last_frame(), Some([0xAA, 0, 0, 0, 0, 0x55]));
    assert_eq!(sink.events.len(), 3, "snapshot, intensity, frame");
}

#[test]
fn low_drift_ramps_blue() {
    let (mut service, mut hw, mut sink) = make_service();
    calibrate(&mut service, &mut hw, &mut sink);

    // Reading 370 sits halfway between low=360 and the dead-band edge 380.
    service.ingest_batch(&[370], &mut hw, &mut sink).unwrap();

    let light = hw.last_light().unwrap();
    assert_eq!((light.red, light.green, light.blue), (0, 0, 128));
    assert_eq!(hw.last_frame(), Some([0xAA, 0, 0, 128, 128, 0x55]));
}

#[test]
fn high_drift_ramps_green() {
    let (mut service, mut hw, mut sink) = make_service();
    calibrate(&mut service, &mut hw, &mut sink);

    // Reading 430 sits halfway between the dead-band edge 420 and top=440.
    service.ingest_batch(&[430], &mut hw, &mut sink).unwrap();

    let light = hw.last_light().unwrap();
    assert_eq!((light.red, light.green, light.blue), (0, 127, 0));
    assert_eq!(hw.last_frame(), Some([0xAA, 0, 127, 0, 127, 0x55]));
    assert_eq!(
        service.snapshot().band.top,
        440,
        "an in-band reading never widens the band"
    );
}

// ── Link behaviour ────────────────────────────────────────────

#[test]
fn link_fault_is_reported_not_fatal() {
    let (mut service, mut hw, mut sink) = make_service();
    calibrate(&mut service, &mut hw, &mut sink);

    hw.fail_with = Some(LinkError::Driver(-7));
    let outcome = service.ingest_batch(&[370], &mut hw, &mut sink);

    assert!(outcome.is_ok(), "a dead link must not poison ingestion");
    assert!(hw.frames.is_empty());
    assert!(
        !service.has_pending_frame(),
        "hard failures drop the frame; only Busy parks it"
    );
    assert!(sink.events.contains(&AppEvent::LinkFault {
        error: LinkError::Driver(-7)
    }));
}

#[test]
fn control_codes_flow_to_the_sink() {
    let (mut service, _hw, mut sink) = make_service();

    service.on_control(ControlCode::Ack, &mut sink);
    service.on_control(ControlCode::Rej, &mut sink);

    assert_eq!(
        sink.events,
        vec![
            AppEvent::ControlReceived(ControlCode::Ack),
            AppEvent::ControlReceived(ControlCode::Rej),
        ]
    );
}

// ── Stability guard ───────────────────────────────────────────

#[test]
fn stability_tick_before_calibration_is_an_error() {
    let (mut service, _hw, mut sink) = make_service();

    assert_eq!(
        service.stability_tick(&mut sink),
        Err(SensorError::NotCalibrated)
    );
    assert!(sink.events.is_empty());
}
