//! Turnout drive controller.
//!
//! Translates switch requests into output pin levels according to the drive
//! type configured for each turnout, and ends coil pulses once their
//! activation delay has elapsed.
//!
//! # Drive Types
//!
//! - [`DriveType::Pulsed`]: solenoid turnouts. The requested end's coil is
//!   energised for the configured delay, then switched off by [`DriveController::expire`].
//! - [`DriveType::Continuous`]: motor turnouts. Both outputs are held at
//!   opposite levels until the next request.
//! - [`DriveType::Unconfigured`]: any other stored value. Requests have no effect.
//!
//! # Channels
//!
//! Every turnout owns two channels: `2*i` (closed end) and `2*i + 1`
//! (thrown end). A pulse in flight cannot be cancelled or restarted; duplicate
//! requests for it are dropped.
//!
//! # Example
//!
//! ```rust
//! use turnout_decoder::drive::{DriveController, SwitchOutcome};
//! use turnout_decoder::profile::HardwareProfile;
//! use turnout_decoder::store::ConfigStore;
//! use turnout_decoder::messages::SwitchCommand;
//! use turnout_decoder::hal::{MockOutputs, MockStore};
//!
//! let profile = HardwareProfile::Sensor;
//! let mut store = ConfigStore::new(MockStore::new(18), profile.turnout_count());
//! store.write(0, 1);   // module address
//! store.write(1, 1);   // turnout 0: pulsed
//! store.write(2, 200); // 200ms pulse
//!
//! let mut outputs = MockOutputs::new();
//! let mut drive = DriveController::new(profile);
//!
//! let outcome = drive.handle(&SwitchCommand::on(1, true), &store, &mut outputs, 0).unwrap();
//! assert_eq!(outcome, SwitchOutcome::PulseStarted { channel: 0 });
//! assert!(outputs.level(2));
//!
//! drive.expire(200, &mut outputs).unwrap();
//! assert!(!outputs.level(2));
//! ```

use crate::messages::SwitchCommand;
use crate::profile::{HardwareProfile, MAX_CHANNELS};
use crate::store::ConfigStore;
use crate::traits::{ByteStore, OutputBank};
use heapless::Vec;

/// Stored drive type value for pulsed (solenoid) turnouts.
pub const DRIVE_PULSED: u16 = 1;

/// Stored drive type value for continuous (motor) turnouts.
pub const DRIVE_CONTINUOUS: u16 = 2;

/// How a turnout's outputs are driven.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveType {
    /// Timed pulse on the requested end.
    Pulsed,
    /// Sustained opposite levels on both ends.
    Continuous,
    /// Unrecognised stored value; the turnout is inactive.
    Unconfigured(u16),
}

impl From<u16> for DriveType {
    fn from(raw: u16) -> Self {
        match raw {
            DRIVE_PULSED => DriveType::Pulsed,
            DRIVE_CONTINUOUS => DriveType::Continuous,
            other => DriveType::Unconfigured(other),
        }
    }
}

/// One output of a turnout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputChannel {
    /// Output pin.
    pub pin: u8,
    /// Whether a pulse is in flight.
    pub active: bool,
    /// Time the pulse started (ms).
    pub started_ms: u64,
    /// Pulse length (ms).
    pub duration_ms: u16,
}

impl OutputChannel {
    /// An idle channel on `pin`.
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            active: false,
            started_ms: 0,
            duration_ms: 0,
        }
    }

    /// Whether the pulse on this channel has run its course at `now_ms`.
    #[inline]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.active && now_ms.saturating_sub(self.started_ms) >= u64::from(self.duration_ms)
    }
}

/// What a switch request did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Address is not one of this decoder's turnouts.
    AddressOutOfRange,
    /// Output code was not the "output on" code.
    OutputIgnored,
    /// Turnout drive type is not configured.
    Unconfigured {
        /// Turnout index.
        turnout: usize,
        /// Raw stored drive type.
        raw: u16,
    },
    /// A pulse was started on `channel`.
    PulseStarted {
        /// Channel index.
        channel: usize,
    },
    /// `channel` is already pulsing; request dropped.
    DuplicateActivation {
        /// Channel index.
        channel: usize,
    },
    /// The other end of the turnout is still pulsing; request dropped.
    SiblingActive {
        /// Channel index of the busy end.
        channel: usize,
    },
    /// Continuous outputs set to the requested direction.
    Driven {
        /// Turnout index.
        turnout: usize,
    },
}

/// Drive controller owning the output channel table.
pub struct DriveController {
    profile: HardwareProfile,
    channels: Vec<OutputChannel, MAX_CHANNELS>,
}

impl DriveController {
    /// Create a controller with idle channels for every pin of `profile`.
    pub fn new(profile: HardwareProfile) -> Self {
        let channels = profile
            .pins()
            .iter()
            .map(|&pin| OutputChannel::new(pin))
            .collect();
        Self { profile, channels }
    }

    /// Number of turnouts driven.
    #[inline]
    pub fn turnout_count(&self) -> usize {
        self.profile.turnout_count()
    }

    /// The output channel table, indexed by channel.
    #[inline]
    pub fn channels(&self) -> &[OutputChannel] {
        &self.channels
    }

    /// Whether any pulse is in flight.
    pub fn any_active(&self) -> bool {
        self.channels.iter().any(|c| c.active)
    }

    /// Map an accessory address to a turnout index, if it is one of ours.
    pub fn turnout_for(&self, address: u16, module_address: u16) -> Option<usize> {
        let offset = address.checked_sub(module_address)? as usize;
        (offset < self.turnout_count()).then_some(offset)
    }

    /// Drive all outputs low, as at power-up.
    pub fn release_all<O: OutputBank>(&mut self, outputs: &mut O) -> Result<(), O::Error> {
        for channel in self.channels.iter_mut() {
            outputs.set_low(channel.pin)?;
            channel.active = false;
        }
        Ok(())
    }

    /// Handle a switch request.
    pub fn handle<O: OutputBank, B: ByteStore>(
        &mut self,
        cmd: &SwitchCommand,
        store: &ConfigStore<B>,
        outputs: &mut O,
        now_ms: u64,
    ) -> Result<SwitchOutcome, O::Error> {
        let module_address = store.module_address();
        let Some(turnout) = self.turnout_for(cmd.address, module_address) else {
            tracing::debug!(address = cmd.address, module_address, "address out of range");
            return Ok(SwitchOutcome::AddressOutOfRange);
        };

        if !cmd.is_output_on() {
            return Ok(SwitchOutcome::OutputIgnored);
        }

        let raw = store.drive_type(turnout);
        let delay = store.activation_delay(turnout);
        tracing::debug!(turnout, drive = raw, delay, closed = cmd.direction, "switch request");

        match DriveType::from(raw) {
            DriveType::Pulsed => self.start_pulse(turnout, cmd.direction, delay, outputs, now_ms),
            DriveType::Continuous => {
                let closed = turnout * 2;
                let thrown = closed + 1;
                self.channels[closed].active = false;
                self.channels[thrown].active = false;
                let (low, high) = if cmd.direction { (thrown, closed) } else { (closed, thrown) };
                // Lower first; both pins must never be high together
                outputs.set_low(self.channels[low].pin)?;
                outputs.set_high(self.channels[high].pin)?;
                tracing::info!(turnout, closed = cmd.direction, "motor driven");
                Ok(SwitchOutcome::Driven { turnout })
            }
            DriveType::Unconfigured(raw) => {
                tracing::debug!(turnout, raw, "turnout not configured");
                Ok(SwitchOutcome::Unconfigured { turnout, raw })
            }
        }
    }

    fn start_pulse<O: OutputBank>(
        &mut self,
        turnout: usize,
        closed: bool,
        delay: u16,
        outputs: &mut O,
        now_ms: u64,
    ) -> Result<SwitchOutcome, O::Error> {
        let channel = turnout * 2 + usize::from(!closed);
        let sibling = channel ^ 1;

        if self.channels[channel].active {
            return Ok(SwitchOutcome::DuplicateActivation { channel });
        }
        if self.channels[sibling].active {
            tracing::debug!(turnout, busy = sibling, "other coil still pulsing");
            return Ok(SwitchOutcome::SiblingActive { channel: sibling });
        }

        let slot = &mut self.channels[channel];
        outputs.set_high(slot.pin)?;
        slot.active = true;
        slot.started_ms = now_ms;
        slot.duration_ms = delay;
        tracing::info!(turnout, channel, pin = slot.pin, delay, "coil energised");
        Ok(SwitchOutcome::PulseStarted { channel })
    }

    /// End every pulse whose duration has elapsed at `now_ms`.
    ///
    /// Channels are scanned in index order. Returns how many were ended.
    pub fn expire<O: OutputBank>(&mut self, now_ms: u64, outputs: &mut O) -> Result<usize, O::Error> {
        let mut expired = 0;
        for (index, channel) in self.channels.iter_mut().enumerate() {
            if channel.is_expired(now_ms) {
                outputs.set_low(channel.pin)?;
                channel.active = false;
                expired += 1;
                tracing::debug!(channel = index, pin = channel.pin, "coil released");
            }
        }
        Ok(expired)
    }
}
