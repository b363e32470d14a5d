//! Driver error taxonomy
//!
//! Every error is returned synchronously from the call that caused it.
//! Nothing is retried except the bus-busy recovery that precedes a start
//! condition. Encoding never fails: unsupported characters and overlong
//! strings are dropped silently.

use segline_hal::BusFault;

/// Polling loops that can time out in bounded mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitPoint {
    /// Bus never went idle despite forced stops
    BusIdle,
    /// Start condition never completed
    StartComplete,
    /// Transmit buffer never emptied
    TransmitterReady,
    /// Byte never finished clocking out
    TransmissionComplete,
    /// Stop condition never completed
    StopComplete,
}

/// Errors returned by the segment driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Display, device index or frame family out of range (no bus access made)
    InvalidArgument,
    /// Start condition failed or arbitration was lost while issuing it
    BusStartFailure(BusFault),
    /// Slave did not acknowledge its address
    AddressNackFailure,
    /// Transmitter rejected the address byte
    AddressSendFailure(BusFault),
    /// Slave did not acknowledge the data byte at this index
    DataNackFailure(usize),
    /// Transmitter rejected the data byte at `index`
    DataSendFailure { index: usize, fault: BusFault },
    /// A bounded polling loop gave up
    Timeout(WaitPoint),
}
