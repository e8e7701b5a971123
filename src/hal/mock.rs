//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and transport traits,
//! enabling development and testing on desktop without a decoder board.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockOutputs`] | [`OutputBank`] | Tracks pin levels and write history |
//! | [`MockSensor`] | [`SensorInput`] | Settable sensor byte, injectable failure |
//! | [`MockStore`] | [`ByteStore`] | In-memory EEPROM with write counting |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockBus`] | [`BusTransport`] | Queued incoming, captured outgoing |
//!
//! # Example
//!
//! ```rust
//! use turnout_decoder::{Decoder, DecoderConfig, HardwareProfile};
//! use turnout_decoder::hal::{MockOutputs, MockSensor, MockStore};
//!
//! let mut bytes = MockStore::new(18);
//! bytes.set_word(0, 10); // module address 10
//! bytes.set_word(1, 2);  // turnout 0: motor
//!
//! let config = DecoderConfig::default().with_profile(HardwareProfile::Sensor);
//! let mut decoder = Decoder::new(config, MockOutputs::new(), MockSensor::new(0xFF), bytes);
//!
//! decoder.handle_switch(&turnout_decoder::messages::SwitchCommand::on(10, false), 0).unwrap();
//! assert!(!decoder.outputs().level(2));
//! assert!(decoder.outputs().level(3));
//! ```
//!
//! [`OutputBank`]: crate::traits::OutputBank
//! [`SensorInput`]: crate::traits::SensorInput
//! [`ByteStore`]: crate::traits::ByteStore
//! [`Clock`]: crate::traits::Clock
//! [`BusTransport`]: crate::traits::BusTransport

use crate::messages::{BusMessage, OutboundMessage, SwitchReport};
use crate::traits::{BusTransport, ByteStore, Clock, OutputBank, SensorInput};
use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Highest pin number tracked by [`MockOutputs`].
pub const MOCK_PIN_COUNT: usize = 32;

/// Mock output bank for testing.
///
/// Records the level of every pin and the full write history.
///
/// # Example
///
/// ```rust
/// use turnout_decoder::hal::MockOutputs;
/// use turnout_decoder::traits::OutputBank;
///
/// let mut outputs = MockOutputs::new();
/// outputs.set_high(3).unwrap();
/// outputs.set_low(3).unwrap();
///
/// assert!(!outputs.level(3));
/// assert_eq!(outputs.history, vec![(3, true), (3, false)]);
/// ```
#[derive(Debug)]
pub struct MockOutputs {
    levels: [bool; MOCK_PIN_COUNT],
    /// Every `(pin, level)` write in order.
    pub history: Vec<(u8, bool)>,
    /// Pin whose writes fail, if any.
    pub failing_pin: Option<u8>,
}

impl MockOutputs {
    /// Creates a mock with every pin low.
    pub fn new() -> Self {
        Self {
            levels: [false; MOCK_PIN_COUNT],
            history: Vec::new(),
            failing_pin: None,
        }
    }

    /// Current level of `pin`.
    pub fn level(&self, pin: u8) -> bool {
        self.levels.get(pin as usize).copied().unwrap_or(false)
    }

    /// Pins currently driven high.
    pub fn high_pins(&self) -> Vec<u8> {
        (0..MOCK_PIN_COUNT as u8).filter(|&p| self.level(p)).collect()
    }
}

impl Default for MockOutputs {
    fn default() -> Self {
        Self::new()
    }
}

/// Error returned by [`MockOutputs`] for its failing pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockPinError(pub u8);

impl OutputBank for MockOutputs {
    type Error = MockPinError;

    fn set_level(&mut self, pin: u8, high: bool) -> Result<(), MockPinError> {
        if self.failing_pin == Some(pin) || pin as usize >= MOCK_PIN_COUNT {
            return Err(MockPinError(pin));
        }
        self.levels[pin as usize] = high;
        self.history.push((pin, high));
        Ok(())
    }
}

/// Mock sensor input for testing.
///
/// Set `byte` to simulate contacts; set `fail` to make reads fail.
///
/// # Example
///
/// ```rust
/// use turnout_decoder::hal::MockSensor;
/// use turnout_decoder::traits::SensorInput;
///
/// let mut sensor = MockSensor::new(0xFE);
/// assert_eq!(sensor.read_all(), Ok(0xFE));
///
/// sensor.fail = true;
/// assert!(sensor.read_all().is_err());
/// assert_eq!(sensor.reads, 2);
/// ```
#[derive(Debug, Default)]
pub struct MockSensor {
    /// Byte returned by reads.
    pub byte: u8,
    /// Whether reads fail.
    pub fail: bool,
    /// Number of reads attempted.
    pub reads: usize,
}

impl MockSensor {
    /// Creates a mock reading `byte`.
    pub fn new(byte: u8) -> Self {
        Self {
            byte,
            ..Default::default()
        }
    }
}

impl SensorInput for MockSensor {
    type Error = ();

    fn read_all(&mut self) -> Result<u8, ()> {
        self.reads += 1;
        if self.fail {
            Err(())
        } else {
            Ok(self.byte)
        }
    }
}

/// Mock EEPROM for testing.
///
/// Reads beyond the end return `0xFF` like erased cells; writes beyond the
/// end are discarded.
///
/// # Example
///
/// ```rust
/// use turnout_decoder::hal::MockStore;
/// use turnout_decoder::traits::ByteStore;
///
/// let mut store = MockStore::new(4);
/// store.update(1, 0x12);
/// store.update(1, 0x12); // unchanged, not physically written
///
/// assert_eq!(store.read(1), 0x12);
/// assert_eq!(store.physical_writes, 1);
/// ```
#[derive(Clone, Debug)]
pub struct MockStore {
    bytes: Vec<u8>,
    /// Number of bytes physically rewritten.
    pub physical_writes: usize,
}

impl MockStore {
    /// Creates a zeroed store of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self::filled(len, 0)
    }

    /// Creates a store of `len` bytes all holding `byte`.
    pub fn filled(len: usize, byte: u8) -> Self {
        Self {
            bytes: vec![byte; len],
            physical_writes: 0,
        }
    }

    /// Creates a store holding the uninitialized sentinel (65534) at index 0
    /// and garbage elsewhere.
    pub fn uninitialized(len: usize) -> Self {
        let mut store = Self::filled(len, 0xFF);
        store.set_word(0, crate::store::UNINITIALIZED);
        store
    }

    /// Poke a 16-bit little-endian value at configuration `index`.
    pub fn set_word(&mut self, index: u16, value: u16) {
        let offset = index as usize * 2;
        if offset + 1 < self.bytes.len() {
            self.bytes[offset] = (value & 0xFF) as u8;
            self.bytes[offset + 1] = (value >> 8) as u8;
        }
    }

    /// Raw byte at `offset`.
    pub fn byte(&self, offset: usize) -> u8 {
        self.read(offset)
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the store has no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl ByteStore for MockStore {
    fn read(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0xFF)
    }

    fn update(&mut self, offset: usize, value: u8) {
        if let Some(cell) = self.bytes.get_mut(offset) {
            if *cell != value {
                *cell = value;
                self.physical_writes += 1;
            }
        }
    }
}

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
///
/// # Example
///
/// ```rust
/// use turnout_decoder::hal::MockClock;
/// use turnout_decoder::traits::Clock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self { current_ms: 0 }
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

// ============================================================================
// Transport Mock
// ============================================================================

/// Mock bus transport for testing.
///
/// Incoming messages are delivered in the order they were queued; every
/// sent message is captured in `sent`.
///
/// # Example
///
/// ```rust
/// use turnout_decoder::hal::MockBus;
/// use turnout_decoder::traits::BusTransport;
/// use turnout_decoder::messages::{BusMessage, OutboundMessage, SwitchReport};
///
/// let mut bus = MockBus::new();
/// bus.queue(BusMessage::Other);
/// assert_eq!(bus.try_receive(), Some(BusMessage::Other));
///
/// let report = SwitchReport { address: 1, closed: true, thrown: false };
/// bus.send(OutboundMessage::SwitchReport(report)).unwrap();
/// assert_eq!(bus.sent_reports(), vec![report]);
/// ```
#[derive(Debug, Default)]
pub struct MockBus {
    /// Messages waiting to be received.
    pub incoming: VecDeque<BusMessage>,
    /// Messages sent by the decoder.
    pub sent: Vec<OutboundMessage>,
    /// Whether sends fail.
    pub fail_sends: bool,
}

impl MockBus {
    /// Creates an empty mock bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an incoming message.
    pub fn queue(&mut self, msg: BusMessage) {
        self.incoming.push_back(msg);
    }

    /// Switch reports sent so far, in order.
    pub fn sent_reports(&self) -> Vec<SwitchReport> {
        self.sent
            .iter()
            .filter_map(|m| match m {
                OutboundMessage::SwitchReport(r) => Some(*r),
                OutboundMessage::Programming(_) => None,
            })
            .collect()
    }
}

impl BusTransport for MockBus {
    type Error = ();

    fn try_receive(&mut self) -> Option<BusMessage> {
        self.incoming.pop_front()
    }

    fn send(&mut self, msg: OutboundMessage) -> Result<(), ()> {
        if self.fail_sends {
            return Err(());
        }
        self.sent.push(msg);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_reject_failing_pin() {
        let mut outputs = MockOutputs::new();
        outputs.failing_pin = Some(5);
        assert_eq!(outputs.set_high(5), Err(MockPinError(5)));
        assert!(outputs.set_high(4).is_ok());
        assert_eq!(outputs.high_pins(), vec![4]);
    }

    #[test]
    fn outputs_reject_unknown_pin() {
        let mut outputs = MockOutputs::new();
        assert!(outputs.set_high(200).is_err());
        assert!(!outputs.level(200));
    }

    #[test]
    fn store_out_of_range_reads_erased() {
        let mut store = MockStore::new(2);
        store.update(10, 1);
        assert_eq!(store.read(10), 0xFF);
        assert_eq!(store.physical_writes, 0);
    }

    #[test]
    fn uninitialized_store_holds_sentinel() {
        let store = MockStore::uninitialized(4);
        assert_eq!(store.byte(0), 0xFE);
        assert_eq!(store.byte(1), 0xFF);
    }

    #[test]
    fn bus_fifo_order() {
        let mut bus = MockBus::new();
        bus.queue(BusMessage::ProgrammingRead {
            article: 1,
            index: 0,
        });
        bus.queue(BusMessage::Other);
        assert!(matches!(
            bus.try_receive(),
            Some(BusMessage::ProgrammingRead { .. })
        ));
        assert_eq!(bus.try_receive(), Some(BusMessage::Other));
        assert_eq!(bus.try_receive(), None);
    }

    #[test]
    fn bus_send_failure() {
        let mut bus = MockBus::new();
        bus.fail_sends = true;
        assert!(bus.send(OutboundMessage::SwitchReport(SwitchReport {
            address: 1,
            closed: false,
            thrown: false,
        }))
        .is_err());
        assert!(bus.sent.is_empty());
    }
}
