//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `host`: Standard library clock, channel transport and file-backed EEPROM (requires `std` feature)
//! - `embedded`: `embedded-hal` 1.0 output pins and PCF8574 expander (requires `embedded` feature)

pub mod mock;

#[cfg(feature = "std")]
pub mod host;

#[cfg(feature = "embedded")]
pub mod embedded;

pub use mock::*;

#[cfg(feature = "std")]
pub use host::*;
