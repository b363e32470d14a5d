//! Simulated HAL for host-side testing
//!
//! Implements the `segline-hal` capability interface without hardware:
//!
//! - [`SimBus`] - I2C master with a recorded transcript, fault injection
//!   and behavioral models of the PCF85176 and PCF85134 controllers
//! - [`SimDelay`] - `DelayNs` implementation that only accumulates time
//!
//! Everything is deterministic, so driver tests can assert on exact
//! sequences of bus primitives.

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod controller;
pub mod delay;

pub use bus::{BusEvent, Signal, SimBus, EVENT_CAPACITY};
pub use controller::{Pcf85134, Pcf85176};
pub use delay::SimDelay;
