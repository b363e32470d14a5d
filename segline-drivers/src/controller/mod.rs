//! Per-controller framing
//!
//! Each controller expects its segment data wrapped in a few command bytes
//! that select the chip behind a shared slave address and reset its data
//! pointer. The framing functions here are pure; they produce a
//! [`Message`] for the transactor and never touch the bus.

pub mod pcf85134;
pub mod pcf85176;

use heapless::Vec;
use segline_hal::BusAddress;

/// Longest framed write (PCF85134: 5 command bytes + 8 data bytes)
pub const MAX_MESSAGE_LEN: usize = 16;

/// Mode configuration sent to both controller families at power-on
///
/// The same bytes are valid on both chips even though they frame commands
/// differently:
///
/// | Byte | PCF85176 (continuation bit)  | PCF85134 (control bytes)      |
/// |------|------------------------------|-------------------------------|
/// | 0x80 | data pointer 0, more follow  | command follows, more follow  |
/// | 0xC9 | mode set: static, enabled    | mode set: static, enabled     |
/// | 0x80 | data pointer 0, more follow  | command follows, more follow  |
/// | 0xF8 | bank select 0                | bank select 0                 |
/// | 0x00 | data pointer 0, last command | last command follows          |
/// | 0xF0 | (taken as segment data)      | blink off                     |
pub const MODE_SET_SEQUENCE: [u8; 6] = [
    pcf85134::cmd::CONTROL_CONTINUE,
    pcf85134::cmd::MODE_SET | pcf85134::cmd::MODE_ENABLE | pcf85134::cmd::MODE_STATIC,
    pcf85134::cmd::CONTROL_CONTINUE,
    pcf85134::cmd::BANK_SELECT,
    pcf85134::cmd::CONTROL_COMMAND,
    pcf85134::cmd::BLINK_OFF,
];

/// A write ready for the transactor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Slave address of the controller family
    pub address: BusAddress,
    /// Command and segment bytes, in wire order
    pub bytes: Vec<u8, MAX_MESSAGE_LEN>,
}

impl Message {
    /// Assemble a message from byte runs
    ///
    /// Returns `None` if the runs do not fit in one message.
    pub(crate) fn from_parts(address: BusAddress, parts: &[&[u8]]) -> Option<Self> {
        let mut bytes = Vec::new();
        for part in parts {
            bytes.extend_from_slice(part).ok()?;
        }
        Some(Self { address, bytes })
    }
}
