//! I2C bus abstractions
//!
//! Unlike a transaction-level `write(address, bytes)` API, the segment
//! driver runs the master-write sequence itself so that it can recover a
//! wedged bus and report exactly which phase failed. Implementations only
//! expose the individual bus primitives and status flags.

/// Faults reported by the bus primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusFault {
    /// Another master drove the bus while we were transmitting
    Collision,
    /// Arbitration lost
    ArbitrationLost,
    /// Peripheral refused the request because the bus is busy
    Busy,
    /// Other error
    Other,
}

/// 7-bit I2C slave address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusAddress(u8);

impl BusAddress {
    /// Create an address from its 7-bit value (the top bit is discarded)
    pub const fn new(address: u8) -> Self {
        Self(address & 0x7F)
    }

    /// The 7-bit address
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Address byte as it appears on the wire with the R/W bit clear
    pub const fn write_byte(self) -> u8 {
        self.0 << 1
    }
}

/// I2C bus master, driven one phase at a time
///
/// Every status query is a non-blocking poll; the caller decides how long
/// to wait. Methods take `&mut self` because reading a status register
/// may clear flags on real hardware.
pub trait I2cMaster {
    /// Configure the peripheral for master operation
    ///
    /// # Arguments
    /// * `peripheral_clock_hz` - Clock feeding the I2C peripheral
    fn configure(&mut self, peripheral_clock_hz: u32);

    /// Set the SCL frequency
    ///
    /// Returns the frequency actually achieved by the clock divider.
    fn set_frequency(&mut self, bus_clock_hz: u32) -> u32;

    /// Enable or disable the peripheral
    fn enable(&mut self, enabled: bool);

    /// True when neither we nor another master own the bus
    fn is_idle(&mut self) -> bool;

    /// Issue a start condition
    fn start(&mut self) -> Result<(), BusFault>;

    /// True once the start condition has been generated
    fn is_start_complete(&mut self) -> bool;

    /// Issue a stop condition
    fn stop(&mut self);

    /// True once the stop condition has been generated
    fn is_stop_complete(&mut self) -> bool;

    /// True when the transmit buffer can accept a byte
    fn is_transmitter_ready(&mut self) -> bool;

    /// Load a byte into the transmitter
    fn send_byte(&mut self, byte: u8) -> Result<(), BusFault>;

    /// True once the last byte (and its ACK bit) has been clocked out
    fn is_transmission_complete(&mut self) -> bool;

    /// True if the slave acknowledged the last byte
    fn is_acknowledged(&mut self) -> bool;

    /// True if arbitration was lost since the flag was last cleared
    fn has_arbitration_loss(&mut self) -> bool;

    /// Clear the arbitration loss flag
    fn clear_arbitration_loss(&mut self);
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 100_000, // 100kHz standard mode
        }
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_write_byte() {
        assert_eq!(BusAddress::new(0x38).write_byte(), 0x70);
        assert_eq!(BusAddress::new(0x39).write_byte(), 0x72);
    }

    #[test]
    fn test_address_discards_high_bit() {
        assert_eq!(BusAddress::new(0xB8).get(), 0x38);
    }
}
