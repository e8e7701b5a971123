//! Remote configuration (LNCV) programming session.
//!
//! Configuration records can only be read or written remotely inside an
//! explicitly opened session, so a single stray message can never change
//! the decoder's address or turnout behavior.
//!
//! # States
//!
//! ```text
//!            start(article, own address | 0xFFFF)
//!   Idle ─────────────────────────────────────────▶ Active
//!    ▲                                                │ read / write
//!    └──────────── stop(article, own address) ────────┘
//! ```
//!
//! Requests carrying another article number belong to a different decoder
//! type and are ignored without a reply.
//!
//! # Example
//!
//! ```rust
//! use turnout_decoder::programming::{ProgrammingSession, StartOutcome, DISCOVERY_ADDRESS};
//! use turnout_decoder::store::ConfigStore;
//! use turnout_decoder::hal::MockStore;
//!
//! let mut store = ConfigStore::new(MockStore::new(18), 4);
//! store.write(0, 12);
//!
//! let mut session = ProgrammingSession::new(5030);
//! let outcome = session.start(5030, DISCOVERY_ADDRESS, &store).unwrap();
//! assert_eq!(outcome, StartOutcome::Opened { address: 12 });
//! assert_eq!(session.read(5030, 0, &store), Some(Ok(12)));
//! ```

use crate::store::ConfigStore;
use crate::traits::ByteStore;

/// Module address that matches every decoder of the right article number.
pub const DISCOVERY_ADDRESS: u16 = 0xFFFF;

/// Session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not in a session; reads and writes fail.
    #[default]
    Idle,
    /// Session open; reads and writes within range succeed.
    Active,
}

/// Why a programming request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProgrammingError {
    /// Start named neither this module's address nor the discovery address.
    AddressMismatch,
    /// Read or write without an open session.
    SessionClosed,
    /// Configuration index beyond the record count.
    IndexOutOfRange,
}

impl core::fmt::Display for ProgrammingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProgrammingError::AddressMismatch => write!(f, "module address mismatch"),
            ProgrammingError::SessionClosed => write!(f, "no programming session open"),
            ProgrammingError::IndexOutOfRange => write!(f, "configuration index out of range"),
        }
    }
}

/// Result of a start request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// Session opened. `address` is the real module address, also when the
    /// request used the discovery address.
    Opened {
        /// This decoder's module address.
        address: u16,
    },
    /// Request was for another article number; nothing happened.
    NotMine,
}

/// Programming session state machine.
#[derive(Debug)]
pub struct ProgrammingSession {
    article: u16,
    state: SessionState,
}

impl ProgrammingSession {
    /// Create an idle session for a decoder with article number `article`.
    pub fn new(article: u16) -> Self {
        Self {
            article,
            state: SessionState::Idle,
        }
    }

    /// Article number this decoder answers to.
    #[inline]
    pub fn article(&self) -> u16 {
        self.article
    }

    /// Current session state.
    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a session is open.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Handle a start request.
    pub fn start<B: ByteStore>(
        &mut self,
        article: u16,
        requested: u16,
        store: &ConfigStore<B>,
    ) -> Result<StartOutcome, ProgrammingError> {
        if article != self.article {
            return Ok(StartOutcome::NotMine);
        }

        let address = store.module_address();
        if requested != address && requested != DISCOVERY_ADDRESS {
            tracing::warn!(requested, address, "programming start for another module");
            return Err(ProgrammingError::AddressMismatch);
        }

        self.state = SessionState::Active;
        tracing::info!(address, discovery = requested == DISCOVERY_ADDRESS, "programming session opened");
        Ok(StartOutcome::Opened { address })
    }

    /// Handle a read request.
    ///
    /// Returns `None` when the request is for another article number.
    pub fn read<B: ByteStore>(
        &self,
        article: u16,
        index: u16,
        store: &ConfigStore<B>,
    ) -> Option<Result<u16, ProgrammingError>> {
        if article != self.article {
            return None;
        }
        Some(self.check(index, store).map(|()| {
            let value = store.read(index);
            tracing::debug!(index, value, "configuration read");
            value
        }))
    }

    /// Handle a write request.
    ///
    /// Returns `None` when the request is for another article number.
    pub fn write<B: ByteStore>(
        &self,
        article: u16,
        index: u16,
        value: u16,
        store: &mut ConfigStore<B>,
    ) -> Option<Result<(), ProgrammingError>> {
        if article != self.article {
            return None;
        }
        Some(self.check(index, store).map(|()| {
            store.write(index, value);
            tracing::info!(index, value, "configuration written");
        }))
    }

    /// Handle a stop request.
    ///
    /// Closes the session only when it is open and `address` is this
    /// module's address; anything else is ignored.
    pub fn stop<B: ByteStore>(&mut self, article: u16, address: u16, store: &ConfigStore<B>) {
        if self.is_active() && article == self.article && address == store.module_address() {
            self.state = SessionState::Idle;
            tracing::info!(address, "programming session closed");
        }
    }

    fn check<B: ByteStore>(&self, index: u16, store: &ConfigStore<B>) -> Result<(), ProgrammingError> {
        if !self.is_active() {
            tracing::warn!(index, "configuration access outside a session");
            return Err(ProgrammingError::SessionClosed);
        }
        if !store.contains(index) {
            tracing::warn!(index, records = store.record_count(), "configuration index out of range");
            return Err(ProgrammingError::IndexOutOfRange);
        }
        Ok(())
    }
}
