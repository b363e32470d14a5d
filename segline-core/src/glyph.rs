//! Seven-segment character codes
//!
//! Segment bit order is `gfedcba` (bit 6 = g ... bit 0 = a). The LCD
//! controllers wire a digit's segments to the upper 7 bits of its RAM byte
//! and the decimal point to bit 0, so codes are handed out pre-shifted.
//!
//! ```text
//!    aaa
//!   f   b
//!   f   b
//!    ggg
//!   e   c
//!   e   c
//!    ddd  .
//! ```

/// Decimal point bit within a digit byte
pub const PERIOD_BIT: u8 = 0x01;

/// A segment pattern positioned in bits 7..1 of a digit byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentCode(u8);

impl SegmentCode {
    /// Wrap a raw `gfedcba` pattern
    pub const fn from_pattern(pattern: u8) -> Self {
        Self((pattern & 0x7F) << 1)
    }

    /// The shifted bits, ready to be OR'd into a digit byte
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// The unshifted `gfedcba` pattern
    pub const fn pattern(self) -> u8 {
        self.0 >> 1
    }
}

/// Unshifted pattern for a supported character
///
/// Letters are matched upper-case only; [`code_for`] folds case first.
/// K, M, Q, R, V, W, X and Z have no legible rendering and are absent.
const fn pattern_for(c: char) -> Option<u8> {
    let pattern = match c {
        ' ' => 0x00,
        '-' => 0x40,
        '0' => 0x3F,
        '1' => 0x06,
        '2' => 0x5B,
        '3' => 0x4F,
        '4' => 0x66,
        '5' => 0x6D,
        '6' => 0x7D,
        '7' => 0x07,
        '8' => 0x7F,
        '9' => 0x6F,
        'A' => 0x77,
        'B' => 0x7C,
        'C' => 0x39,
        'D' => 0x5E,
        'E' => 0x79,
        'F' => 0x71,
        'G' => 0x6F,
        'H' => 0x76,
        'I' => 0x06,
        'J' => 0x0E,
        'L' => 0x38,
        'N' => 0x54, // lower-case n
        'O' => 0x3F,
        'P' => 0x73,
        'S' => 0x6D,
        'T' => 0x78, // lower-case t
        'U' => 0x3E,
        'Y' => 0x6E,
        _ => return None,
    };
    Some(pattern)
}

/// Look up the segment code for a character
///
/// Case-insensitive. Returns `None` for anything that cannot be drawn,
/// including `.` and `,` which the encoder handles as flags.
pub fn code_for(c: char) -> Option<SegmentCode> {
    pattern_for(c.to_ascii_uppercase()).map(SegmentCode::from_pattern)
}
