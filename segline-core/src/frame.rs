//! Segment frames and the string encoder
//!
//! A frame is the raw segment RAM image for one display. Text is encoded
//! right to left so that short strings are right-aligned, the way numbers
//! are read on a price or volume display.

use crate::family::{DeviceFamily, MAX_FRAME_LEN};
use crate::glyph::{code_for, PERIOD_BIT};

/// Raw segment data for one display
///
/// The length is fixed by the family and never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentFrame {
    family: DeviceFamily,
    bytes: [u8; MAX_FRAME_LEN],
}

impl SegmentFrame {
    /// All segments off
    pub const fn blank(family: DeviceFamily) -> Self {
        Self {
            family,
            bytes: [0; MAX_FRAME_LEN],
        }
    }

    /// Every frame byte set to `byte`
    pub fn filled(family: DeviceFamily, byte: u8) -> Self {
        let mut frame = Self::blank(family);
        frame.bytes[..family.frame_len()].fill(byte);
        frame
    }

    /// Build a frame from raw bytes
    ///
    /// Returns `None` unless `bytes` is exactly one frame long.
    pub fn from_bytes(family: DeviceFamily, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != family.frame_len() {
            return None;
        }
        let mut frame = Self::blank(family);
        frame.bytes[..bytes.len()].copy_from_slice(bytes);
        Some(frame)
    }

    /// Family this frame was built for
    pub const fn family(&self) -> DeviceFamily {
        self.family
    }

    /// Frame contents, `family().frame_len()` bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.family.frame_len()]
    }

    /// Byte of the `n`th digit counted from the right
    pub fn digit(&self, n: usize) -> Option<u8> {
        self.family.digit_byte(n).map(|i| self.bytes[i])
    }

    /// Comma segment byte
    pub fn commas(&self) -> u8 {
        self.bytes[self.family.comma_byte()]
    }

    fn set(&mut self, index: usize, bits: u8) {
        self.bytes[index] |= bits;
    }
}

/// Encode display text into a segment frame
///
/// Scans `text` from the right. `.` sets the period of the digit placed
/// last and `,` sets the comma after the digits placed so far; either is
/// dropped if no digit has been placed yet. Characters without a segment
/// code are skipped. Once every digit slot is used the rest of the string
/// (the more significant end) is dropped.
///
/// ```
/// use segline_core::{encode, DeviceFamily};
///
/// let frame = encode("1.23", DeviceFamily::Small);
/// assert_eq!(frame.as_bytes(), &[0x9E, 0xB7, 0x0C, 0x00, 0x00]);
/// ```
pub fn encode(text: &str, family: DeviceFamily) -> SegmentFrame {
    let mut frame = SegmentFrame::blank(family);
    // Digits placed so far; 0 is the sentinel right of the last slot
    let mut placed = 0usize;

    for c in text.chars().rev() {
        match c {
            '.' => {
                if let Some(last) = placed.checked_sub(1).and_then(|n| family.digit_byte(n)) {
                    frame.set(last, PERIOD_BIT);
                }
            }
            ',' => {
                if placed > 0 {
                    frame.set(family.comma_byte(), family.comma_mask(placed));
                }
            }
            _ => {
                let Some(code) = code_for(c) else {
                    continue;
                };
                let Some(slot) = family.digit_byte(placed) else {
                    break;
                };
                frame.set(slot, code.bits());
                placed += 1;
            }
        }
    }

    frame
}
