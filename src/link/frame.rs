//! Intensity frame codec and peer control codes.
//!
//! Wire format (fixed length, no escaping):
//! ```text
//! ┌──────┬─────┬───────┬──────┬──────────┬──────┐
//! │ 0xAA │ red │ green │ blue │ checksum │ 0x55 │
//! └──────┴─────┴───────┴──────┴──────────┴──────┘
//! ```
//!
//! `checksum = (red + green + blue) mod 256`. The frame length is fixed,
//! so the type system carries it; a short or long frame cannot be built.

use crate::engine::feedback::IntensityTriple;

/// Total frame length on the wire.
pub const FRAME_LEN: usize = 6;

/// First byte of every frame.
pub const START_BYTE: u8 = 0xAA;

/// Last byte of every frame.
pub const STOP_BYTE: u8 = 0x55;

/// A complete on-wire frame.
pub type FeedbackFrame = [u8; FRAME_LEN];

/// Build the wire frame for an intensity triple.
pub fn encode_feedback(triple: IntensityTriple) -> FeedbackFrame {
    let checksum = triple
        .red
        .wrapping_add(triple.green)
        .wrapping_add(triple.blue);
    [
        START_BYTE,
        triple.red,
        triple.green,
        triple.blue,
        checksum,
        STOP_BYTE,
    ]
}

/// Single-byte responses the peer may send back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlCode {
    Ack = 0x06,
    Nak = 0x15,
    Rej = 0x21,
}

impl ControlCode {
    /// Classify an inbound byte. Anything else on the line is noise.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x06 => Some(Self::Ack),
            0x15 => Some(Self::Nak),
            0x21 => Some(Self::Rej),
            _ => None,
        }
    }

    /// Short name for log lines.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Ack => "ACK",
            Self::Nak => "NAK",
            Self::Rej => "REJ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_carries_delimiters_and_checksum() {
        let frame = encode_feedback(IntensityTriple {
            red: 0,
            green: 0,
            blue: 128,
        });
        assert_eq!(frame, [0xAA, 0, 0, 128, 128, 0x55]);

        let frame = encode_feedback(IntensityTriple {
            red: 10,
            green: 20,
            blue: 30,
        });
        assert_eq!(frame[0], START_BYTE);
        assert_eq!(frame[5], STOP_BYTE);
        assert_eq!(frame[4], 60);
    }

    #[test]
    fn checksum_wraps_modulo_256() {
        let frame = encode_feedback(IntensityTriple {
            red: 255,
            green: 255,
            blue: 255,
        });
        assert_eq!(frame[4], 253); // 765 mod 256
    }

    #[test]
    fn all_zero_triple_still_frames() {
        let frame = encode_feedback(IntensityTriple::OFF);
        assert_eq!(frame, [0xAA, 0, 0, 0, 0, 0x55]);
    }

    #[test]
    fn control_codes_classify_known_bytes_only() {
        assert_eq!(ControlCode::from_byte(0x06), Some(ControlCode::Ack));
        assert_eq!(ControlCode::from_byte(0x15), Some(ControlCode::Nak));
        assert_eq!(ControlCode::from_byte(0x21), Some(ControlCode::Rej));
        assert_eq!(ControlCode::from_byte(0x00), None);
        assert_eq!(ControlCode::from_byte(0xAA), None);
        assert_eq!(ControlCode::from_byte(0xFF), None);
    }

    #[test]
    fn mnemonics_are_stable() {
        assert_eq!(ControlCode::Ack.mnemonic(), "ACK");
        assert_eq!(ControlCode::Nak.mnemonic(), "NAK");
        assert_eq!(ControlCode::Rej.mnemonic(), "REJ");
    }
}
