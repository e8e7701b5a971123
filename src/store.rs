//! Persistent configuration records (LNCVs) over a byte store.
//!
//! Each configuration index holds one 16-bit value stored little-endian at
//! byte offset `index * 2`.
//!
//! # Record Layout
//!
//! ```text
//! index 0        module base address
//! index 2*i + 1  drive type of turnout i   (1 = pulsed, 2 = continuous)
//! index 2*i + 2  activation delay of turnout i (ms)
//! ```
//!
//! A store holding [`UNINITIALIZED`] at index 0 has never been configured and
//! is reset to address 1 with every other record cleared.
//!
//! # Example
//!
//! ```rust
//! use turnout_decoder::store::ConfigStore;
//! use turnout_decoder::hal::MockStore;
//!
//! let mut store = ConfigStore::new(MockStore::uninitialized(64), 4);
//! assert!(store.ensure_initialized());
//! assert_eq!(store.module_address(), 1);
//!
//! store.write(2, 250);
//! assert_eq!(store.activation_delay(0), 250);
//! ```

use crate::traits::ByteStore;

/// Sentinel held at index 0 by a store that was never configured.
pub const UNINITIALIZED: u16 = 65534;

/// Index of the module base address.
pub const MODULE_ADDRESS_INDEX: u16 = 0;

/// Number of configuration records for `turnouts` turnouts.
#[inline]
pub const fn record_count(turnouts: usize) -> u16 {
    (turnouts * 2 + 1) as u16
}

/// Index holding the drive type of turnout `turnout`.
#[inline]
pub const fn drive_type_index(turnout: usize) -> u16 {
    (turnout * 2 + 1) as u16
}

/// Index holding the activation delay of turnout `turnout`.
#[inline]
pub const fn delay_index(turnout: usize) -> u16 {
    (turnout * 2 + 2) as u16
}

/// Configuration record store.
///
/// Performs no bounds checking of its own; callers keep indices below
/// [`ConfigStore::record_count`]. The programming session enforces that for
/// remote access.
pub struct ConfigStore<B: ByteStore> {
    bytes: B,
    records: u16,
}

impl<B: ByteStore> ConfigStore<B> {
    /// Wrap `bytes` as the record store for `turnouts` turnouts.
    pub fn new(bytes: B, turnouts: usize) -> Self {
        Self {
            bytes,
            records: record_count(turnouts),
        }
    }

    /// Persist `value` at `index` (low byte first).
    pub fn write(&mut self, index: u16, value: u16) {
        let offset = index as usize * 2;
        self.bytes.update(offset, (value & 0xFF) as u8);
        self.bytes.update(offset + 1, (value >> 8) as u8);
    }

    /// Read the value stored at `index`.
    pub fn read(&self, index: u16) -> u16 {
        let offset = index as usize * 2;
        u16::from(self.bytes.read(offset)) | (u16::from(self.bytes.read(offset + 1)) << 8)
    }

    /// Clear every record and set the module address to 1.
    pub fn reset(&mut self) {
        for index in 1..self.records {
            self.write(index, 0);
        }
        self.write(MODULE_ADDRESS_INDEX, 1);
    }

    /// Reset the store if it still holds the uninitialized sentinel.
    ///
    /// Returns `true` when a reset was performed.
    pub fn ensure_initialized(&mut self) -> bool {
        if self.read(MODULE_ADDRESS_INDEX) != UNINITIALIZED {
            return false;
        }
        tracing::warn!(records = self.records, "configuration uninitialized, resetting");
        self.reset();
        true
    }

    /// Number of valid configuration indices.
    #[inline]
    pub fn record_count(&self) -> u16 {
        self.records
    }

    /// Whether `index` addresses a valid record.
    #[inline]
    pub fn contains(&self, index: u16) -> bool {
        index < self.records
    }

    /// Stored module base address.
    #[inline]
    pub fn module_address(&self) -> u16 {
        self.read(MODULE_ADDRESS_INDEX)
    }

    /// Raw drive type value of `turnout`.
    #[inline]
    pub fn drive_type(&self, turnout: usize) -> u16 {
        self.read(drive_type_index(turnout))
    }

    /// Activation delay of `turnout` in milliseconds.
    #[inline]
    pub fn activation_delay(&self, turnout: usize) -> u16 {
        self.read(delay_index(turnout))
    }

    /// Whether the record at `flag_index` enables feedback reporting.
    #[inline]
    pub fn feedback_enabled(&self, flag_index: u16) -> bool {
        self.read(flag_index) == 1
    }

    /// Borrow the underlying byte store.
    pub fn bytes(&self) -> &B {
        &self.bytes
    }

    /// Unwrap the underlying byte store.
    pub fn into_inner(self) -> B {
        self.bytes
    }
}
