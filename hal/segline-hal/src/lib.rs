//! Segline Hardware Abstraction Layer
//!
//! This crate defines the capability interface the segment driver needs
//! from the microcontroller: a byte-level I2C master with explicit
//! start / address / data / stop phases and status polling. Chip-specific
//! crates (or the host simulator) implement it; the driver logic depends
//! on nothing else.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (fuel dispenser demo, etc.)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  segline-drivers (router, transactor)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  segline-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  chip HAL     │       │ segline-hal-  │
//! │  adapter      │       │     sim       │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cMaster`] - Phase-level I2C master operations

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;

// Re-export key types at crate root for convenience
pub use i2c::{BusAddress, BusFault, I2cConfig, I2cMaster};
