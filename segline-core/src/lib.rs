//! Board-agnostic segment encoding for seven-segment LCD modules
//!
//! This crate contains everything that does not touch the bus:
//!
//! - Character to segment code table
//! - Display families, their RAM layouts and bus addresses
//! - Right-to-left string encoder producing segment frames
//! - Driver configuration types

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod family;
pub mod frame;
pub mod glyph;

pub use config::{DriverConfig, PollMode};
pub use family::{DeviceFamily, DisplayId, Route, UnknownDisplay, MAX_FRAME_LEN};
pub use frame::{encode, SegmentFrame};
pub use glyph::{code_for, SegmentCode, PERIOD_BIT};
