//! Serial feedback link.
//!
//! Outbound traffic is fixed-size intensity frames; inbound traffic is
//! single-byte control codes from the peer. The peer's codes carry no
//! control semantics today and are surfaced for diagnostics only.

pub mod frame;

pub use frame::{ControlCode, FeedbackFrame, FRAME_LEN, START_BYTE, STOP_BYTE, encode_feedback};
