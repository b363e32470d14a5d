//! Display families and logical display identifiers
//!
//! Two glass/controller combinations are supported:
//!
//! | Family  | Glass | Controller | Digits | Units            | Address |
//! |---------|-------|------------|--------|------------------|---------|
//! | `Small` | H4198 | PCF85176   | 4      | up to 3          | 0x38    |
//! | `Large` | H4235 | PCF85134   | 6      | 1 (2 lines)      | 0x39    |
//!
//! Segment RAM layout, one byte per digit, period on bit 0:
//!
//! ```text
//! Small (5 bytes)                  Large (8 bytes, 7 used)
//! byte 0   rightmost digit         byte 0   leftmost digit
//! byte 1-2 digits, has period      byte 1   digit
//! byte 3   leftmost digit          byte 2-4 digits, have period
//! byte 4   commas (0x07)           byte 5   rightmost digit
//!                                  byte 6   commas (0xE0)
//!                                  byte 7   not connected
//! ```

use segline_hal::BusAddress;

/// Largest frame of any family
pub const MAX_FRAME_LEN: usize = 8;

/// Supported display module families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceFamily {
    /// 4-digit, 40-segment module (H4198 on PCF85176)
    Small,
    /// 2 x 6-digit, 60-segment-per-line module (H4235 on PCF85134)
    Large,
}

impl DeviceFamily {
    /// Number of digit slots per display
    pub const fn digits(self) -> usize {
        match self {
            DeviceFamily::Small => 4,
            DeviceFamily::Large => 6,
        }
    }

    /// Segment frame length in bytes
    pub const fn frame_len(self) -> usize {
        match self {
            DeviceFamily::Small => 5,
            DeviceFamily::Large => 8,
        }
    }

    /// Number of bytes the controller actually displays
    pub const fn data_len(self) -> usize {
        match self {
            DeviceFamily::Small => 5,
            DeviceFamily::Large => 7,
        }
    }

    /// Slave address shared by all controllers of this family
    pub const fn bus_address(self) -> BusAddress {
        match self {
            DeviceFamily::Small => BusAddress::new(0x38),
            DeviceFamily::Large => BusAddress::new(0x39),
        }
    }

    /// Frame byte holding the `n`th digit counted from the right
    ///
    /// Returns `None` once `n` reaches the digit capacity.
    pub const fn digit_byte(self, n: usize) -> Option<usize> {
        if n >= self.digits() {
            return None;
        }
        match self {
            DeviceFamily::Small => Some(n),
            DeviceFamily::Large => Some(5 - n),
        }
    }

    /// Frame byte holding the comma segments
    pub const fn comma_byte(self) -> usize {
        match self {
            DeviceFamily::Small => 4,
            DeviceFamily::Large => 6,
        }
    }

    /// Comma segment for a separator following `placed` digits
    ///
    /// Only three separator positions are wired; anything else maps to no
    /// segment.
    pub const fn comma_mask(self, placed: usize) -> u8 {
        match (self, placed) {
            (DeviceFamily::Small, 1) => 0x04,
            (DeviceFamily::Small, 2) => 0x02,
            (DeviceFamily::Small, 3) => 0x01,
            (DeviceFamily::Large, 1) => 0x20,
            (DeviceFamily::Large, 2) => 0x40,
            (DeviceFamily::Large, 3) => 0x80,
            _ => 0,
        }
    }
}

/// Logical displays on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayId {
    /// Large module, top line
    L1,
    /// Large module, bottom line
    L2,
    /// Small module, left
    S1,
    /// Small module, middle
    S2,
    /// Small module, right
    S3,
}

/// Where a logical display lives on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    /// Small family controller selected by hardware device address 0-2
    Small { device: u8 },
    /// Large family line 0 (top) or 1 (bottom)
    Large { line: u8 },
}

impl Route {
    /// Family served by this route
    pub const fn family(self) -> DeviceFamily {
        match self {
            Route::Small { .. } => DeviceFamily::Small,
            Route::Large { .. } => DeviceFamily::Large,
        }
    }
}

impl DisplayId {
    /// Every display, in power-on self-test order
    pub const ALL: [DisplayId; 5] = [
        DisplayId::L1,
        DisplayId::L2,
        DisplayId::S1,
        DisplayId::S2,
        DisplayId::S3,
    ];

    /// Resolve the family and unit for this display
    pub const fn route(self) -> Route {
        match self {
            DisplayId::L1 => Route::Large { line: 0 },
            DisplayId::L2 => Route::Large { line: 1 },
            DisplayId::S1 => Route::Small { device: 0 },
            DisplayId::S2 => Route::Small { device: 1 },
            DisplayId::S3 => Route::Small { device: 2 },
        }
    }

    /// Family of this display
    pub const fn family(self) -> DeviceFamily {
        self.route().family()
    }
}

/// Numeric display identifier outside 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownDisplay(pub u8);

impl TryFrom<u8> for DisplayId {
    type Error = UnknownDisplay;

    /// Board numbering: 1 = L1, 2 = L2, 3 = S1, 4 = S2, 5 = S3
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DisplayId::L1),
            2 => Ok(DisplayId::L2),
            3 => Ok(DisplayId::S1),
            4 => Ok(DisplayId::S2),
            5 => Ok(DisplayId::S3),
            other => Err(UnknownDisplay(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_layout() {
        let f = DeviceFamily::Small;
        assert_eq!(f.frame_len(), 5);
        assert_eq!(f.digit_byte(0), Some(0));
        assert_eq!(f.digit_byte(3), Some(3));
        assert_eq!(f.digit_byte(4), None);
        assert_eq!(f.comma_byte(), 4);
        assert_eq!(f.bus_address().write_byte(), 0x70);
    }

    #[test]
    fn test_large_layout() {
        let f = DeviceFamily::Large;
        assert_eq!(f.frame_len(), 8);
        assert_eq!(f.data_len(), 7);
        assert_eq!(f.digit_byte(0), Some(5));
        assert_eq!(f.digit_byte(5), Some(0));
        assert_eq!(f.digit_byte(6), None);
        assert_eq!(f.comma_byte(), 6);
        assert_eq!(f.bus_address().write_byte(), 0x72);
    }

    #[test]
    fn test_comma_masks_cover_wired_segments() {
        let small: u8 = (0..=5).map(|n| DeviceFamily::Small.comma_mask(n)).fold(0, |a, m| a | m);
        let large: u8 = (0..=7).map(|n| DeviceFamily::Large.comma_mask(n)).fold(0, |a, m| a | m);
        assert_eq!(small, 0x07);
        assert_eq!(large, 0xE0);
        assert_eq!(DeviceFamily::Small.comma_mask(0), 0);
        assert_eq!(DeviceFamily::Small.comma_mask(4), 0);
        assert_eq!(DeviceFamily::Large.comma_mask(4), 0);
    }

    #[test]
    fn test_routes() {
        assert_eq!(DisplayId::L1.route(), Route::Large { line: 0 });
        assert_eq!(DisplayId::L2.route(), Route::Large { line: 1 });
        assert_eq!(DisplayId::S3.route(), Route::Small { device: 2 });
        assert_eq!(DisplayId::S2.family(), DeviceFamily::Small);
    }

    #[test]
    fn test_numeric_ids() {
        assert_eq!(DisplayId::try_from(1), Ok(DisplayId::L1));
        assert_eq!(DisplayId::try_from(5), Ok(DisplayId::S3));
        assert_eq!(DisplayId::try_from(0), Err(UnknownDisplay(0)));
        assert_eq!(DisplayId::try_from(6), Err(UnknownDisplay(6)));
    }
}
