//! Adapters from `embedded-hal` 1.0 drivers to the decoder traits.
//!
//! - [`PinBank`]: a fixed set of [`OutputPin`]s addressed by pin number
//! - [`Pcf8574`]: the PCF8574 I2C port expander carrying the position sensors
//!
//! # Example
//!
//! ```rust,ignore
//! use turnout_decoder::hal::embedded::{PinBank, Pcf8574};
//!
//! let outputs = PinBank::new([(2, d2), (3, d3), (4, d4), (5, d5), (6, d6), (9, d9), (10, d10), (11, d11)]);
//! let mut sensor = Pcf8574::new(i2c, 0x38);
//! sensor.release_inputs()?;
//! ```

use crate::traits::{OutputBank, SensorInput};
use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::i2c::I2c;

/// Failure of a [`PinBank`] write.
#[derive(Debug, PartialEq, Eq)]
pub enum PinBankError<E> {
    /// No pin with this number is in the bank.
    UnknownPin(u8),
    /// The pin driver failed.
    Pin(E),
}

/// Output pins addressed by their board pin number.
pub struct PinBank<P: OutputPin, const N: usize> {
    pins: [(u8, P); N],
}

impl<P: OutputPin, const N: usize> PinBank<P, N> {
    /// Build a bank from `(pin number, driver)` pairs.
    pub fn new(pins: [(u8, P); N]) -> Self {
        Self { pins }
    }

    /// Release the drivers.
    pub fn into_inner(self) -> [(u8, P); N] {
        self.pins
    }
}

impl<P: OutputPin, const N: usize> OutputBank for PinBank<P, N> {
    type Error = PinBankError<P::Error>;

    fn set_level(&mut self, pin: u8, high: bool) -> Result<(), Self::Error> {
        let (_, driver) = self
            .pins
            .iter_mut()
            .find(|(number, _)| *number == pin)
            .ok_or(PinBankError::UnknownPin(pin))?;
        driver
            .set_state(PinState::from(high))
            .map_err(PinBankError::Pin)
    }
}

/// PCF8574 quasi-bidirectional I/O expander used as sensor input.
pub struct Pcf8574<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Pcf8574<I2C> {
    /// Wrap the bus for the expander at 7-bit `address`.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Write all ones so every port pin can be pulled low by its sensor.
    pub fn release_inputs(&mut self) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[0xFF])
    }

    /// I2C address of the expander.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the I2C bus.
    pub fn into_inner(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> SensorInput for Pcf8574<I2C> {
    type Error = I2C::Error;

    fn read_all(&mut self) -> Result<u8, Self::Error> {
        let mut port = [0u8; 1];
        self.i2c.read(self.address, &mut port)?;
        Ok(port[0])
    }
}
