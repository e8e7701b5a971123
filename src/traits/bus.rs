//! Bus transport abstraction.
//!
//! The decoder never touches the physical bus. A transport implementation
//! owns framing, checksums and collision avoidance, and exchanges decoded
//! messages with the decoder through [`BusTransport`].
//!
//! # Polling Model
//!
//! The dispatcher calls [`BusTransport::try_receive`] once per loop
//! iteration, so a burst of messages drains one per iteration, interleaved
//! with timer and feedback scans.

use crate::messages::{BusMessage, OutboundMessage};

/// Bus transport trait (sync, non-blocking).
///
/// # Implementation Notes
///
/// - `try_receive` must never block; return `None` when nothing is pending
/// - `send` is fire-and-forget: no acknowledgment is tracked by the decoder
/// - Messages must be delivered in arrival order
///
/// # Example
///
/// ```rust
/// use turnout_decoder::traits::BusTransport;
/// use turnout_decoder::hal::MockBus;
/// use turnout_decoder::messages::{BusMessage, SwitchCommand};
///
/// let mut bus = MockBus::new();
/// bus.queue(BusMessage::Switch(SwitchCommand::on(1, true)));
///
/// assert!(bus.try_receive().is_some());
/// assert!(bus.try_receive().is_none());
/// ```
pub trait BusTransport {
    /// Error type for send operations.
    type Error: core::fmt::Debug;

    /// Try to receive the next message (non-blocking).
    fn try_receive(&mut self) -> Option<BusMessage>;

    /// Hand a message to the transport for sending.
    fn send(&mut self, msg: OutboundMessage) -> Result<(), Self::Error>;
}
