//! Bus message types exchanged with the transport layer.
//!
//! The transport hands the decoder already-classified [`BusMessage`]s and
//! accepts [`OutboundMessage`]s to send. Framing, checksums and collision
//! handling stay on the transport side.
//!
//! With the `serde` feature enabled every type here derives
//! `Serialize`/`Deserialize`, which the desktop simulator uses to read
//! messages as JSON lines:
//!
//! ```text
//! {"switch":{"address":1,"output":16,"direction":true}}
//! {"programming_start":{"article":5030,"address":65535}}
//! {"programming_read":{"article":5030,"index":2}}
//! ```

use crate::programming::ProgrammingError;

/// Output code carried by a switch request when the output is switched on.
///
/// Requests with any other output code (the "off" half of a button press)
/// are accepted and ignored.
pub const OUTPUT_ON: u8 = 16;

/// A switch request addressed to one turnout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchCommand {
    /// Accessory address (1-based).
    pub address: u16,
    /// Output code, [`OUTPUT_ON`] when the output is being energised.
    pub output: u8,
    /// `true` selects the closed end, `false` the thrown end.
    pub direction: bool,
}

impl SwitchCommand {
    /// Switch request that energises the output for `address`.
    pub const fn on(address: u16, direction: bool) -> Self {
        Self {
            address,
            output: OUTPUT_ON,
            direction,
        }
    }

    /// Whether this request carries the "output on" code.
    #[inline]
    pub const fn is_output_on(&self) -> bool {
        self.output == OUTPUT_ON
    }
}

/// A turnout position report.
///
/// See [`crate::wire::encode_switch_report`] for the two-byte encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchReport {
    /// Accessory address (1-based).
    pub address: u16,
    /// Closed-end sensor asserted.
    pub closed: bool,
    /// Thrown-end sensor asserted.
    pub thrown: bool,
}

/// A message delivered by the bus transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BusMessage {
    /// Switch request for an accessory address.
    Switch(SwitchCommand),
    /// Open a programming session.
    ProgrammingStart {
        /// Article number of the decoder type being addressed.
        article: u16,
        /// Module address, or `0xFFFF` for discovery.
        address: u16,
    },
    /// Read one configuration record.
    ProgrammingRead {
        /// Article number of the decoder type being addressed.
        article: u16,
        /// Configuration index.
        index: u16,
    },
    /// Write one configuration record.
    ProgrammingWrite {
        /// Article number of the decoder type being addressed.
        article: u16,
        /// Configuration index.
        index: u16,
        /// Value to store.
        value: u16,
    },
    /// Close a programming session.
    ProgrammingStop {
        /// Article number of the decoder type being addressed.
        article: u16,
        /// Module address the session was opened for.
        address: u16,
    },
    /// Anything the transport could not classify.
    Other,
}

/// Reply to a programming request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProgrammingReply {
    /// Session opened; `address` is the real module address.
    Started {
        /// Article number of this decoder.
        article: u16,
        /// Module address of this decoder.
        address: u16,
    },
    /// Value read from the configuration store.
    Value {
        /// Article number of this decoder.
        article: u16,
        /// Configuration index that was read.
        index: u16,
        /// Stored value.
        value: u16,
    },
    /// Value written to the configuration store.
    Written {
        /// Article number of this decoder.
        article: u16,
        /// Configuration index that was written.
        index: u16,
        /// Value now stored.
        value: u16,
    },
    /// Request refused.
    Rejected {
        /// Article number of this decoder.
        article: u16,
        /// Why the request failed.
        error: ProgrammingError,
    },
}

/// A message handed to the bus transport for sending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OutboundMessage {
    /// Turnout position report.
    SwitchReport(SwitchReport),
    /// Reply to a programming request.
    Programming(ProgrammingReply),
}

impl From<SwitchReport> for OutboundMessage {
    fn from(report: SwitchReport) -> Self {
        OutboundMessage::SwitchReport(report)
    }
}

impl From<ProgrammingReply> for OutboundMessage {
    fn from(reply: ProgrammingReply) -> Self {
        OutboundMessage::Programming(reply)
    }
}
