//! Application core — pure domain logic, zero I/O.
//!
//! This module wires the calibration engine to the outside world: snapshot
//! fan-out, feedback actuation, and link retry policy. All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
