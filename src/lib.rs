//! # turnout-decoder
//!
//! A LocoNet accessory decoder that drives model railway turnouts, is
//! configured over the bus with LNCV programming, and reports turnout
//! positions read from end-of-travel sensors.
//!
//! ## Features
//!
//! - **Switch requests**: Coil (pulsed) and motor (continuous) turnouts on consecutive addresses
//! - **LNCV programming**: Session-gated read and write of persistent configuration records
//! - **Position feedback**: Change-only switch reports from a PCF8574 sensor expander
//! - **Non-blocking main loop**: Pulses end on a later iteration, nothing ever sleeps
//! - **Hardware abstraction**: Traits for outputs, sensors, EEPROM, clock and bus transport
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware and bus abstractions
//! - `store` - Configuration records over byte-addressed EEPROM
//! - `programming` - LNCV programming session state machine
//! - `drive` - Output channel table and pulse timing
//! - `feedback` - Sensor change detection
//! - `decoder` - State aggregate that routes bus messages
//! - `dispatcher` - Main loop tying the decoder to a transport and clock
//! - `hal` - Concrete implementations (mock for testing, host and embedded-hal adapters)
//!
//! ## Example
//!
//! ```rust
//! use turnout_decoder::{
//!     Decoder, DecoderConfig, Dispatcher, HardwareProfile,
//!     hal::{MockBus, MockClock, MockOutputs, MockSensor, MockStore},
//!     messages::{BusMessage, SwitchCommand},
//! };
//!
//! // Fresh EEPROM: the decoder resets it to module address 1
//! let config = DecoderConfig::default().with_profile(HardwareProfile::Sensor);
//! let decoder = Decoder::new(
//!     config,
//!     MockOutputs::new(),
//!     MockSensor::new(0xFF),
//!     MockStore::uninitialized(config.storage_bytes()),
//! );
//! let mut dispatcher = Dispatcher::new(decoder, MockBus::new(), MockClock::new());
//! dispatcher.startup();
//!
//! // Program turnout 0 as a 50 ms coil
//! dispatcher.transport_mut().queue(BusMessage::ProgrammingStart { article: 5030, address: 1 });
//! dispatcher.transport_mut().queue(BusMessage::ProgrammingWrite { article: 5030, index: 1, value: 1 });
//! dispatcher.transport_mut().queue(BusMessage::ProgrammingWrite { article: 5030, index: 2, value: 50 });
//! dispatcher.transport_mut().queue(BusMessage::Switch(SwitchCommand::on(1, true)));
//! for _ in 0..4 {
//!     dispatcher.poll_once();
//! }
//! assert!(dispatcher.decoder().outputs().level(2));
//!
//! // Call the loop again once the delay has elapsed
//! dispatcher.clock_mut().advance(50);
//! dispatcher.poll_once();
//! assert!(!dispatcher.decoder().outputs().level(2));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Decoder configuration (article number, hardware profile, expander address).
pub mod config;
/// Decoder state aggregate and message routing.
pub mod decoder;
/// Main loop driver.
pub mod dispatcher;
/// Output channel table, drive types and pulse timing.
pub mod drive;
/// Sensor change detection and switch report generation.
pub mod feedback;
/// Hardware Abstraction Layer with mock implementations for testing.
pub mod hal;
/// Bus message types consumed and produced by the decoder.
pub mod messages;
/// Build-time hardware profiles and pin maps.
pub mod profile;
/// LNCV programming session state machine.
pub mod programming;
/// Persistent configuration records.
pub mod store;
/// Core traits for hardware and bus abstraction.
pub mod traits;
/// LocoNet switch request and report byte layouts.
pub mod wire;

// Re-exports for convenience
pub use config::DecoderConfig;
pub use decoder::{Decoder, DecoderError, HardwareError, MessageOutcome};
pub use dispatcher::{Dispatcher, PollSummary};
pub use drive::{DriveController, DriveType, OutputChannel, SwitchOutcome};
pub use feedback::{FeedbackMonitor, Reports};
pub use messages::{
    BusMessage, OutboundMessage, ProgrammingReply, SwitchCommand, SwitchReport,
};
pub use profile::HardwareProfile;
pub use programming::{ProgrammingError, ProgrammingSession, SessionState, StartOutcome};
pub use store::ConfigStore;
pub use traits::{
    // Transport
    BusTransport,
    // Hardware
    ByteStore,
    Clock,
    NoSensor,
    OutputBank,
    SensorInput,
};
