//! The decoder state aggregate.
//!
//! [`Decoder`] owns everything the firmware keeps between loop iterations:
//! configuration records, the programming session, the output channel
//! table and (on feedback-capable profiles) the feedback monitor, together
//! with the hardware they act on.
//!
//! # Startup
//!
//! [`Decoder::new`] repairs an uninitialized configuration store.
//! [`Decoder::startup`] then drives every output low and runs the forced
//! feedback pass that reports every turnout once.
//!
//! # Example
//!
//! ```rust
//! use turnout_decoder::{Decoder, DecoderConfig, HardwareProfile};
//! use turnout_decoder::hal::{MockOutputs, MockSensor, MockStore};
//! use turnout_decoder::messages::{BusMessage, SwitchCommand};
//!
//! let config = DecoderConfig::default().with_profile(HardwareProfile::Sensor);
//! let mut decoder = Decoder::new(
//!     config,
//!     MockOutputs::new(),
//!     MockSensor::new(0xFF),
//!     MockStore::uninitialized(18),
//! );
//! assert_eq!(decoder.module_address(), 1);
//!
//! decoder.startup().unwrap();
//! decoder
//!     .handle_message(&BusMessage::Switch(SwitchCommand::on(1, true)), 0)
//!     .unwrap();
//! ```

use crate::config::DecoderConfig;
use crate::drive::{DriveController, SwitchOutcome};
use crate::feedback::{FeedbackMonitor, Reports};
use crate::messages::{BusMessage, ProgrammingReply, SwitchCommand};
use crate::programming::{ProgrammingSession, StartOutcome};
use crate::store::ConfigStore;
use crate::traits::{ByteStore, OutputBank, SensorInput};

/// Hardware failure while driving outputs or reading sensors.
#[derive(Debug, PartialEq, Eq)]
pub enum DecoderError<O, S> {
    /// An output pin could not be set.
    Output(O),
    /// The sensor input could not be read.
    Sensor(S),
}

impl<O: core::fmt::Debug, S: core::fmt::Debug> core::fmt::Display for DecoderError<O, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecoderError::Output(e) => write!(f, "output error: {:?}", e),
            DecoderError::Sensor(e) => write!(f, "sensor error: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<O: core::fmt::Debug, S: core::fmt::Debug> std::error::Error for DecoderError<O, S> {}

/// Error type of a decoder built on `O` outputs and `S` sensors.
pub type HardwareError<O, S> =
    DecoderError<<O as OutputBank>::Error, <S as SensorInput>::Error>;

/// What handling one bus message did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageOutcome {
    /// The message was a switch request.
    Switch(SwitchOutcome),
    /// The message was a programming request; `None` when no reply is due.
    Programming(Option<ProgrammingReply>),
    /// The message was not for this decoder type.
    Dropped,
}

/// Decoder state and hardware.
pub struct Decoder<O: OutputBank, S: SensorInput, B: ByteStore> {
    config: DecoderConfig,
    store: ConfigStore<B>,
    session: ProgrammingSession,
    drive: DriveController,
    feedback: Option<FeedbackMonitor>,
    outputs: O,
    sensor: S,
}

impl<O: OutputBank, S: SensorInput, B: ByteStore> Decoder<O, S, B> {
    /// Build a decoder, resetting the configuration store if it was never
    /// initialized.
    pub fn new(config: DecoderConfig, outputs: O, sensor: S, bytes: B) -> Self {
        let profile = config.profile;
        let mut store = ConfigStore::new(bytes, profile.turnout_count());
        store.ensure_initialized();

        let feedback = profile
            .has_feedback()
            .then(|| FeedbackMonitor::new(profile.turnout_count(), config.feedback_flag_index));

        tracing::info!(
            address = store.module_address(),
            profile = profile.as_str(),
            turnouts = profile.turnout_count(),
            feedback = feedback.is_some(),
            "decoder ready"
        );

        Self {
            session: ProgrammingSession::new(config.article_number),
            drive: DriveController::new(profile),
            config,
            store,
            feedback,
            outputs,
            sensor,
        }
    }

    /// Drive all outputs low and run the forced feedback pass.
    ///
    /// Returns the startup position reports (empty without feedback).
    pub fn startup(&mut self) -> Result<Reports, HardwareError<O, S>> {
        self.drive
            .release_all(&mut self.outputs)
            .map_err(DecoderError::Output)?;
        self.poll_feedback(true)
    }

    /// Route one bus message.
    pub fn handle_message(
        &mut self,
        msg: &BusMessage,
        now_ms: u64,
    ) -> Result<MessageOutcome, HardwareError<O, S>> {
        match msg {
            BusMessage::Switch(cmd) => self.handle_switch(cmd, now_ms).map(MessageOutcome::Switch),
            BusMessage::Other => {
                tracing::trace!("unrecognised message dropped");
                Ok(MessageOutcome::Dropped)
            }
            programming => Ok(MessageOutcome::Programming(
                self.handle_programming(programming),
            )),
        }
    }

    /// Handle a switch request.
    pub fn handle_switch(
        &mut self,
        cmd: &SwitchCommand,
        now_ms: u64,
    ) -> Result<SwitchOutcome, HardwareError<O, S>> {
        self.drive
            .handle(cmd, &self.store, &mut self.outputs, now_ms)
            .map_err(DecoderError::Output)
    }

    /// Handle a programming request, returning the reply to send, if any.
    pub fn handle_programming(&mut self, msg: &BusMessage) -> Option<ProgrammingReply> {
        let article = self.session.article();
        match *msg {
            BusMessage::ProgrammingStart { article: a, address } => {
                match self.session.start(a, address, &self.store) {
                    Ok(StartOutcome::Opened { address }) => {
                        Some(ProgrammingReply::Started { article, address })
                    }
                    Ok(StartOutcome::NotMine) => None,
                    Err(error) => Some(ProgrammingReply::Rejected { article, error }),
                }
            }
            BusMessage::ProgrammingRead { article: a, index } => {
                self.session
                    .read(a, index, &self.store)
                    .map(|result| match result {
                        Ok(value) => ProgrammingReply::Value {
                            article,
                            index,
                            value,
                        },
                        Err(error) => ProgrammingReply::Rejected { article, error },
                    })
            }
            BusMessage::ProgrammingWrite {
                article: a,
                index,
                value,
            } => self
                .session
                .write(a, index, value, &mut self.store)
                .map(|result| match result {
                    Ok(()) => ProgrammingReply::Written {
                        article,
                        index,
                        value,
                    },
                    Err(error) => ProgrammingReply::Rejected { article, error },
                }),
            BusMessage::ProgrammingStop { article: a, address } => {
                self.session.stop(a, address, &self.store);
                None
            }
            BusMessage::Switch(_) | BusMessage::Other => None,
        }
    }

    /// End every pulse that has run its course.
    pub fn expire(&mut self, now_ms: u64) -> Result<usize, HardwareError<O, S>> {
        self.drive
            .expire(now_ms, &mut self.outputs)
            .map_err(DecoderError::Output)
    }

    /// Run a feedback pass. Always empty on profiles without feedback.
    pub fn poll_feedback(&mut self, forced: bool) -> Result<Reports, HardwareError<O, S>> {
        match self.feedback.as_mut() {
            Some(monitor) => monitor
                .poll(&mut self.sensor, &self.store, forced)
                .map_err(DecoderError::Sensor),
            None => Ok(Reports::new()),
        }
    }

    /// Current module base address.
    #[inline]
    pub fn module_address(&self) -> u16 {
        self.store.module_address()
    }

    /// Firmware configuration.
    #[inline]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Configuration records.
    #[inline]
    pub fn store(&self) -> &ConfigStore<B> {
        &self.store
    }

    /// Programming session.
    #[inline]
    pub fn session(&self) -> &ProgrammingSession {
        &self.session
    }

    /// Drive controller and its channel table.
    #[inline]
    pub fn drive(&self) -> &DriveController {
        &self.drive
    }

    /// Feedback monitor, when the profile has one.
    #[inline]
    pub fn feedback(&self) -> Option<&FeedbackMonitor> {
        self.feedback.as_ref()
    }

    /// Output hardware.
    #[inline]
    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    /// Mutable access to the output hardware.
    #[inline]
    pub fn outputs_mut(&mut self) -> &mut O {
        &mut self.outputs
    }

    /// Sensor hardware.
    #[inline]
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Mutable access to the sensor hardware.
    #[inline]
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}
