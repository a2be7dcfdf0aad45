//! Fuzz target: frame encoding and control-byte classification
//!
//! Feeds arbitrary channel triples through `encode_feedback` and every
//! input byte through `ControlCode::from_byte`.
//!
//! Invariants checked:
//! - Frames always carry the fixed delimiters and a wrapping checksum
//! - Byte classification accepts exactly the three known control codes
//!
//! cargo fuzz run fuzz_frame_codec

#![no_main]

use libfuzzer_sys::fuzz_target;
use proxisense::engine::feedback::IntensityTriple;
use proxisense::link::{ControlCode, FRAME_LEN, START_BYTE, STOP_BYTE, encode_feedback};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let triple = IntensityTriple {
        red: data[0],
        green: data[1],
        blue: data[2],
    };
    let frame = encode_feedback(triple);

    assert_eq!(frame.len(), FRAME_LEN);
    assert_eq!(frame[0], START_BYTE);
    assert_eq!(frame[FRAME_LEN - 1], STOP_BYTE);
    assert_eq!(frame[1], triple.red);
    assert_eq!(frame[2], triple.green);
    assert_eq!(frame[3], triple.blue);
    assert_eq!(
        frame[4],
        data[0].wrapping_add(data[1]).wrapping_add(data[2]),
        "checksum is the wrapping sum of the channels"
    );

    for &byte in data {
        let decoded = ControlCode::from_byte(byte);
        match byte {
            0x06 => assert_eq!(decoded, Some(ControlCode::Ack)),
            0x15 => assert_eq!(decoded, Some(ControlCode::Nak)),
            0x21 => assert_eq!(decoded, Some(ControlCode::Rej)),
            _ => assert_eq!(decoded, None),
        }
    }
});
