//! PCF85134 60-segment controller (large 2 x 6-digit module)
//!
//! Each line of the module has its own chip; both answer to slave address
//! 0x39 and are told apart by device-select. Commands and data are
//! introduced by control bytes:
//!
//! ```text
//! ┌──────┬─────────────┬──────┬──────┬──────┬──────────────┬──────┐
//! │ 0x80 │ 0xE0 | hw   │ 0x80 │ 0x00 │ 0x40 │ 7 data bytes │ 0x00 │
//! │ ctrl │ dev select  │ ctrl │ ptr  │ ctrl │ digits, then │ pad  │
//! │ cmd  │             │ cmd  │ = 0  │ data │ commas       │      │
//! └──────┴─────────────┴──────┴──────┴──────┴──────────────┴──────┘
//! ```

use segline_core::{DeviceFamily, SegmentFrame};

use super::Message;
use crate::error::Error;

/// PCF85134 control bytes and commands
pub mod cmd {
    /// Control byte: another control byte follows
    pub const CONTROL_CONTINUE: u8 = 0x80;
    /// Control byte: the following bytes are display data
    pub const CONTROL_DATA: u8 = 0x40;
    /// Control byte: the following bytes are commands
    pub const CONTROL_COMMAND: u8 = 0x00;
    /// Mode set
    pub const MODE_SET: u8 = 0xC0;
    /// Mode set: display enabled
    pub const MODE_ENABLE: u8 = 0x08;
    /// Mode set: static drive (one backplane)
    pub const MODE_STATIC: u8 = 0x01;
    /// Bank select (input bank 0, output bank 0)
    pub const BANK_SELECT: u8 = 0xF8;
    /// Blink select: blinking off
    pub const BLINK_OFF: u8 = 0xF0;
    /// Load data pointer (low 7 bits)
    pub const LOAD_DATA_POINTER: u8 = 0x00;
    /// Device select (low 3 bits = hardware address)
    pub const DEVICE_SELECT: u8 = 0xE0;
}

/// Hardware device address of each line (top line strapped to 1)
const LINE_DEVICE: [u8; 2] = [1, 0];

/// Byte sent in place of the unconnected last RAM byte
const PADDING: u8 = 0x00;

/// Device-select byte for `line` (0 = top, 1 = bottom)
pub fn device_address(line: u8) -> Option<u8> {
    LINE_DEVICE
        .get(usize::from(line))
        .map(|&hw| cmd::DEVICE_SELECT | hw)
}

/// Frame a segment write for one line of the module
pub fn frame(line: u8, frame: &SegmentFrame) -> Result<Message, Error> {
    if frame.family() != DeviceFamily::Large {
        return Err(Error::InvalidArgument);
    }
    let select = device_address(line).ok_or(Error::InvalidArgument)?;

    let commands = [
        cmd::CONTROL_CONTINUE,
        select,
        cmd::CONTROL_CONTINUE,
        cmd::LOAD_DATA_POINTER,
        cmd::CONTROL_DATA,
    ];
    let data = &frame.as_bytes()[..DeviceFamily::Large.data_len()];
    Message::from_parts(
        DeviceFamily::Large.bus_address(),
        &[&commands[..], data, &[PADDING][..]],
    )
    .ok_or(Error::InvalidArgument)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_set_sequence_bytes() {
        assert_eq!(
            super::super::MODE_SET_SEQUENCE,
            [0x80, 0xC9, 0x80, 0xF8, 0x00, 0xF0]
        );
    }

    #[test]
    fn test_frame_layout() {
        let f = SegmentFrame::from_bytes(DeviceFamily::Large, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let msg = frame(0, &f).unwrap();
        assert_eq!(msg.address.write_byte(), 0x72);
        assert_eq!(
            msg.bytes.as_slice(),
            &[0x80, 0xE1, 0x80, 0x00, 0x40, 1, 2, 3, 4, 5, 6, 7, 0x00]
        );
    }

    #[test]
    fn test_lines() {
        assert_eq!(device_address(0), Some(0xE1));
        assert_eq!(device_address(1), Some(0xE0));
        assert_eq!(device_address(2), None);

        let f = SegmentFrame::filled(DeviceFamily::Large, 0xFF);
        let msg = frame(1, &f).unwrap();
        assert_eq!(msg.bytes[1], 0xE0);
        assert_eq!(msg.bytes.len(), 13);
        // the unconnected byte is always sent as padding
        assert_eq!(msg.bytes[12], 0x00);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let f = SegmentFrame::blank(DeviceFamily::Large);
        assert_eq!(frame(2, &f), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_rejects_small_frame() {
        let f = SegmentFrame::blank(DeviceFamily::Small);
        assert_eq!(frame(0, &f), Err(Error::InvalidArgument));
    }
}
