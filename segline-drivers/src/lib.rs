//! Segment LCD drivers
//!
//! This crate drives the five segment displays on the board over one
//! shared I2C bus:
//!
//! - Bus transactor (master-write state machine with busy-bus recovery)
//! - Controller framing for PCF85176 (small modules) and PCF85134 (large)
//! - Display router (`write(display, text)` and power-on initialization)
//!
//! ```ignore
//! let mut displays = DisplayRouter::new(bus, delay, DriverConfig::default());
//! displays.initialize(PBCLK_HZ)?;
//! displays.write(DisplayId::S1, "3.652")?;
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod controller;
pub mod error;
pub mod router;
pub mod shared;
pub mod transactor;

pub use controller::Message;
pub use error::{Error, WaitPoint};
pub use router::DisplayRouter;
pub use shared::SharedDisplays;
pub use transactor::{BusTransactor, Phase, TransactorConfig};

pub use segline_core::{encode, DisplayId, DriverConfig, PollMode, SegmentFrame};
