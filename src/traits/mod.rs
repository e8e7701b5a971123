//! Trait definitions for hardware abstraction and the bus transport.
//!
//! This module defines the core abstractions that allow the decoder to:
//! - Run on different hardware (microcontroller, desktop mock)
//! - Plug into any LocoNet transport implementation
//!
//! # Submodules
//!
//! - `hardware`: Output pins, sensor input, persistent byte store, clock
//! - `bus`: Non-blocking message transport
//!
//! # Hardware Abstraction
//!
//! - [`OutputBank`]: Turnout coil/motor outputs
//! - [`SensorInput`]: Position sensors read as one byte
//! - [`ByteStore`]: EEPROM-style configuration storage
//! - [`Clock`]: Time source for `no_std` environments

pub mod bus;
pub mod hardware;

pub use bus::*;
pub use hardware::*;
