//! Serial feedback link driver.
//!
//! Owns the UART the peer controller listens on: intensity frames go out
//! whole, single-byte control codes come back. Readiness is a TX-FIFO
//! idle poll, so a busy transmitter is visible before a write is
//! attempted and the caller can park the frame instead of blocking.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: UART1 via the installed driver (hw_init).
//! On host/test: a static busy flag plus a one-slot inbound mailbox.

use log::debug;

use crate::error::LinkError;
use crate::link::{ControlCode, FeedbackFrame};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::link::FRAME_LEN;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_LINK_BUSY: AtomicBool = AtomicBool::new(false);

/// One-slot inbound mailbox; values above 0xFF mean empty.
#[cfg(not(target_os = "espidf"))]
const SIM_RX_EMPTY: u16 = 0x100;

#[cfg(not(target_os = "espidf"))]
static SIM_RX_BYTE: AtomicU16 = AtomicU16::new(SIM_RX_EMPTY);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_link_busy(busy: bool) {
    SIM_LINK_BUSY.store(busy, Ordering::Relaxed);
}

/// Inject one inbound byte. A second injection before the poll
/// overwrites the first, like a peer talking over itself.
#[cfg(not(target_os = "espidf"))]
pub fn sim_push_control(byte: u8) {
    SIM_RX_BYTE.store(u16::from(byte), Ordering::Relaxed);
}

pub struct SerialLink;

impl SerialLink {
    pub fn new() -> Self {
        Self
    }

    /// Whether the transmitter can accept a frame right now.
    pub fn is_ready(&mut self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            hw_init::uart_tx_idle()
        }
        #[cfg(not(target_os = "espidf"))]
        {
            !SIM_LINK_BUSY.load(Ordering::Relaxed)
        }
    }

    /// Queue one frame on the transmitter.
    pub fn send_frame(&mut self, frame: &FeedbackFrame) -> Result<(), LinkError> {
        #[cfg(target_os = "espidf")]
        {
            let n = hw_init::uart_write(frame);
            if n < 0 {
                return Err(LinkError::Driver(n));
            }
            // A short write means the TX ring is out of room.
            if (n as usize) < FRAME_LEN {
                return Err(LinkError::Busy);
            }
            Ok(())
        }
        #[cfg(not(target_os = "espidf"))]
        {
            let _ = frame;
            if SIM_LINK_BUSY.load(Ordering::Relaxed) {
                return Err(LinkError::Busy);
            }
            Ok(())
        }
    }

    /// Drain one inbound byte if the peer sent one. Bytes that are not
    /// control codes are line noise and get logged away.
    pub fn poll_control(&mut self) -> Option<ControlCode> {
        let byte = self.read_byte()?;
        match ControlCode::from_byte(byte) {
            Some(code) => Some(code),
            None => {
                debug!("ignoring stray byte 0x{:02X} on the link", byte);
                None
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_byte(&mut self) -> Option<u8> {
        hw_init::uart_read_byte()
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_byte(&mut self) -> Option<u8> {
        let slot = SIM_RX_BYTE.swap(SIM_RX_EMPTY, Ordering::Relaxed);
        (slot <= 0xFF).then_some(slot as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test: the sim statics are process-wide.
    #[test]
    fn sim_link_round_trip() {
        let mut link = SerialLink::new();
        assert!(link.is_ready());
        assert!(link.poll_control().is_none());

        sim_set_link_busy(true);
        assert!(!link.is_ready());
        assert_eq!(
            link.send_frame(&[0xAA, 0, 0, 0, 0, 0x55]),
            Err(LinkError::Busy)
        );

        sim_set_link_busy(false);
        assert_eq!(link.send_frame(&[0xAA, 0, 0, 0, 0, 0x55]), Ok(()));

        sim_push_control(0x06);
        assert_eq!(link.poll_control(), Some(ControlCode::Ack));
        assert!(link.poll_control().is_none(), "mailbox drained");

        sim_push_control(0xEE);
        assert!(link.poll_control().is_none(), "noise is swallowed");
    }
}
