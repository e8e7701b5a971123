//! Hardware abstraction traits for turnout outputs, sensor inputs and storage.
//!
//! This module defines the hardware interfaces that let the decoder core run
//! on a microcontroller or on a desktop against mocks.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`OutputBank`] | Digital outputs driving coils or motors |
//! | [`SensorInput`] | Bulk read of the position sensor byte |
//! | [`ByteStore`] | EEPROM-like persistent byte storage |
//! | [`Clock`] | Monotonic millisecond time source |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For boards with `embedded-hal` 1.0 drivers,
//! use the adapters in `hal::embedded` (requires `embedded` feature).
//!
//! # Example
//!
//! ```rust
//! use turnout_decoder::traits::OutputBank;
//! use turnout_decoder::hal::MockOutputs;
//!
//! let mut outputs = MockOutputs::new();
//! outputs.set_level(4, true).unwrap();
//! assert!(outputs.level(4));
//! ```

/// Bank of digital output pins addressed by pin number.
///
/// Each pin drives one side of a turnout mechanism: a solenoid coil for
/// pulsed turnouts, or one leg of a motor driver for continuous turnouts.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use turnout_decoder::traits::OutputBank;
///
/// struct Port { /* register handles */ }
///
/// impl OutputBank for Port {
///     type Error = ();
///
///     fn set_level(&mut self, pin: u8, high: bool) -> Result<(), ()> {
///         // Write the port register...
///         Ok(())
///     }
/// }
/// ```
pub trait OutputBank {
    /// Error type for output operations.
    type Error: core::fmt::Debug;

    /// Drive `pin` high (`true`) or low (`false`).
    fn set_level(&mut self, pin: u8, high: bool) -> Result<(), Self::Error>;

    /// Convenience method to drive a pin high.
    fn set_high(&mut self, pin: u8) -> Result<(), Self::Error> {
        self.set_level(pin, true)
    }

    /// Convenience method to drive a pin low.
    fn set_low(&mut self, pin: u8) -> Result<(), Self::Error> {
        self.set_level(pin, false)
    }
}

/// Bulk sensor input, typically an I2C port expander.
///
/// All sensor bits are read at once as a single byte. Bit `2*i` carries the
/// closed-end sensor of turnout `i` and bit `2*i+1` the thrown-end sensor.
/// Sensors are active-low: a cleared bit means the contact is made.
pub trait SensorInput {
    /// Error type for sensor reads.
    type Error: core::fmt::Debug;

    /// Read every input bit as one value.
    fn read_all(&mut self) -> Result<u8, Self::Error>;
}

/// Sensor input for boards without a feedback expander.
///
/// Always reads `0xFF` (no contact asserted).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSensor;

impl SensorInput for NoSensor {
    type Error = core::convert::Infallible;

    fn read_all(&mut self) -> Result<u8, Self::Error> {
        Ok(0xFF)
    }
}

/// EEPROM-like persistent byte store.
///
/// Reads and updates single bytes at absolute offsets. Writes are
/// synchronous and durable; `update` should skip the physical write when the
/// stored byte already holds `value` to spare write cycles.
pub trait ByteStore {
    /// Read the byte at `offset`.
    fn read(&self, offset: usize) -> u8;

    /// Write `value` at `offset` if it differs from the stored byte.
    fn update(&mut self, offset: usize, value: u8);
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for pulse timing.
/// On desktop, this can wrap `std::time::Instant`. On embedded,
/// use a hardware timer.
///
/// # Example
///
/// ```rust
/// use turnout_decoder::traits::Clock;
/// use turnout_decoder::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingBank {
        writes: heapless::Vec<(u8, bool), 8>,
    }

    impl OutputBank for RecordingBank {
        type Error = ();

        fn set_level(&mut self, pin: u8, high: bool) -> Result<(), ()> {
            self.writes.push((pin, high)).map_err(|_| ())
        }
    }

    #[test]
    fn output_bank_default_helpers_delegate_to_set_level() {
        let mut bank = RecordingBank {
            writes: heapless::Vec::new(),
        };
        bank.set_high(3).unwrap();
        bank.set_low(3).unwrap();
        assert_eq!(bank.writes.as_slice(), &[(3, true), (3, false)]);
    }

    #[test]
    fn no_sensor_reads_idle_byte() {
        let mut sensor = NoSensor;
        assert_eq!(sensor.read_all(), Ok(0xFF));
    }
}
