#![allow(dead_code)] // Unified Error funnel reserved for typed top-level returns

//! Unified error types for the ProxiSense firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform. All variants are `Copy`
//! so they can be cheaply passed through event records without allocation.

use core::fmt;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The calibration engine rejected an input or a precondition failed.
    Sensor(SensorError),
    /// The serial feedback link failed or is not ready.
    Link(LinkError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor / engine errors
// ---------------------------------------------------------------------------

/// Non-success classifications from the calibration engine.
///
/// These are absorbed locally by the caller: state is left unchanged (or, for
/// [`SensorError::ObserverMissing`], updated but undelivered) and nothing is
/// actuated on. None of them is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Ingestion was invoked with an empty batch.
    EmptyBatch,
    /// Batch exceeds the history window; rejected before any state change.
    BatchOverrun { len: usize },
    /// Stability check invoked before initial calibration completed.
    NotCalibrated,
    /// Ingestion ran without an observer; snapshot updated but not delivered.
    ObserverMissing,
    /// ADC read returned an error or timed out.
    AdcReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBatch => write!(f, "empty sample batch"),
            Self::BatchOverrun { len } => {
                write!(f, "batch of {len} exceeds the history window")
            }
            Self::NotCalibrated => write!(f, "engine not calibrated yet"),
            Self::ObserverMissing => write!(f, "no snapshot observer registered"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Serial link errors
// ---------------------------------------------------------------------------

/// Transport-level failures on the feedback UART.
///
/// `Busy` is the one recoverable case: the frame stays pending and the main
/// loop retries after a short backoff. The line-condition variants come from
/// the UART driver's RX status and are logged, not escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Transmitter still draining a previous frame.
    Busy,
    /// TX did not complete within the allotted time.
    Timeout,
    /// Parity mismatch on a received byte.
    Parity,
    /// Break condition detected on the line.
    BreakCondition,
    /// Framing error (bad stop bit) on a received byte.
    Framing,
    /// RX FIFO overrun, data lost.
    Overrun,
    /// Raw driver error code with no closer classification.
    Driver(i32),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "transmitter busy"),
            Self::Timeout => write!(f, "transmit timeout"),
            Self::Parity => write!(f, "parity error"),
            Self::BreakCondition => write!(f, "break condition"),
            Self::Framing => write!(f, "framing error"),
            Self::Overrun => write!(f, "RX overrun"),
            Self::Driver(code) => write!(f, "driver error {code}"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Peripheral init errors
// ---------------------------------------------------------------------------

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
