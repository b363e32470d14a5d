//! PCF85176 40-segment controller (small 4-digit modules)
//!
//! Up to three chips share slave address 0x38; each is strapped to a
//! hardware device address 0-2 and only stores data after a matching
//! device-select command.
//!
//! Every command byte carries a continuation flag in bit 7. A write of
//! one frame is:
//!
//! ```text
//! ┌──────────────┬───────────────┬──────────────────────┐
//! │ 0x80         │ 0x60 | device │ 5 segment bytes      │
//! │ pointer = 0, │ select, last  │ digits right to left,│
//! │ more follow  │ command       │ then commas          │
//! └──────────────┴───────────────┴──────────────────────┘
//! ```

use segline_core::{DeviceFamily, SegmentFrame};

use super::Message;
use crate::error::Error;

/// PCF85176 commands
pub mod cmd {
    /// Continuation flag: another command byte follows
    pub const CONTINUE: u8 = 0x80;
    /// Load data pointer (low 6 bits)
    pub const LOAD_DATA_POINTER: u8 = 0x00;
    /// Device select (low 3 bits = hardware address)
    pub const DEVICE_SELECT: u8 = 0x60;
    /// Mode set
    pub const MODE_SET: u8 = 0x40;
    /// Mode set: display enabled
    pub const MODE_ENABLE: u8 = 0x08;
    /// Mode set: static drive (one backplane)
    pub const MODE_STATIC: u8 = 0x01;
    /// Bank select (input bank 0, output bank 0)
    pub const BANK_SELECT: u8 = 0x78;
}

/// Highest hardware device address wired on the board
pub const MAX_DEVICE: u8 = 2;

/// Frame a segment write for the chip at hardware address `device`
pub fn frame(device: u8, frame: &SegmentFrame) -> Result<Message, Error> {
    if device > MAX_DEVICE || frame.family() != DeviceFamily::Small {
        return Err(Error::InvalidArgument);
    }

    let commands = [
        cmd::CONTINUE | cmd::LOAD_DATA_POINTER,
        cmd::DEVICE_SELECT | device,
    ];
    Message::from_parts(DeviceFamily::Small.bus_address(), &[&commands[..], frame.as_bytes()])
        .ok_or(Error::InvalidArgument)
}
