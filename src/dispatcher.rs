//! The firmware main loop.
//!
//! Each call to [`Dispatcher::poll_once`] performs one loop iteration:
//!
//! 1. Receive at most one bus message and route it to the decoder, sending
//!    back any programming reply.
//! 2. End every coil pulse whose delay has elapsed.
//! 3. Run a (non-forced) feedback pass and send the resulting reports.
//!
//! Nothing blocks and nothing sleeps. Hardware or transport failures are
//! logged and the iteration carries on with the next step.
//!
//! # Example
//!
//! ```rust
//! use turnout_decoder::{Decoder, DecoderConfig, Dispatcher, HardwareProfile};
//! use turnout_decoder::hal::{MockBus, MockClock, MockOutputs, MockSensor, MockStore};
//! use turnout_decoder::messages::{BusMessage, SwitchCommand};
//!
//! let config = DecoderConfig::default().with_profile(HardwareProfile::Sensor);
//! let decoder = Decoder::new(config, MockOutputs::new(), MockSensor::new(0xFF), MockStore::new(18));
//! let mut dispatcher = Dispatcher::new(decoder, MockBus::new(), MockClock::new());
//! dispatcher.startup();
//!
//! dispatcher.transport_mut().queue(BusMessage::Switch(SwitchCommand::on(1, true)));
//! let summary = dispatcher.poll_once();
//! assert!(summary.handled.is_some());
//! ```

use crate::decoder::{Decoder, MessageOutcome};
use crate::messages::OutboundMessage;
use crate::traits::{BusTransport, ByteStore, Clock, OutputBank, SensorInput};

/// What one loop iteration did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Outcome of the message handled this iteration, if one arrived.
    pub handled: Option<MessageOutcome>,
    /// Pulses ended this iteration.
    pub expired: usize,
    /// Position reports sent this iteration.
    pub reports: usize,
    /// Hardware or transport failures logged this iteration.
    pub faults: usize,
}

/// Main loop driver tying the decoder to a transport and a clock.
pub struct Dispatcher<T, C, O, S, B>
where
    T: BusTransport,
    C: Clock,
    O: OutputBank,
    S: SensorInput,
    B: ByteStore,
{
    decoder: Decoder<O, S, B>,
    transport: T,
    clock: C,
}

impl<T, C, O, S, B> Dispatcher<T, C, O, S, B>
where
    T: BusTransport,
    C: Clock,
    O: OutputBank,
    S: SensorInput,
    B: ByteStore,
{
    /// Create a dispatcher.
    pub fn new(decoder: Decoder<O, S, B>, transport: T, clock: C) -> Self {
        Self {
            decoder,
            transport,
            clock,
        }
    }

    /// Run the decoder startup sequence and send the initial reports.
    ///
    /// Returns the number of reports sent.
    pub fn startup(&mut self) -> usize {
        match self.decoder.startup() {
            Ok(reports) => {
                let mut sent = 0;
                for report in reports {
                    if self.send(report.into()) {
                        sent += 1;
                    }
                }
                sent
            }
            Err(e) => {
                tracing::error!(error = %e, "startup failed");
                0
            }
        }
    }

    /// Run one loop iteration.
    pub fn poll_once(&mut self) -> PollSummary {
        let mut summary = PollSummary::default();

        if let Some(msg) = self.transport.try_receive() {
            match self.decoder.handle_message(&msg, self.clock.now_ms()) {
                Ok(outcome) => {
                    if let MessageOutcome::Programming(Some(reply)) = outcome {
                        if !self.send(reply.into()) {
                            summary.faults += 1;
                        }
                    }
                    summary.handled = Some(outcome);
                }
                Err(e) => {
                    tracing::error!(error = %e, ?msg, "message handling failed");
                    summary.faults += 1;
                }
            }
        }

        match self.decoder.expire(self.clock.now_ms()) {
            Ok(expired) => summary.expired = expired,
            Err(e) => {
                tracing::error!(error = %e, "pulse release failed");
                summary.faults += 1;
            }
        }

        match self.decoder.poll_feedback(false) {
            Ok(reports) => {
                for report in reports {
                    if self.send(report.into()) {
                        summary.reports += 1;
                    } else {
                        summary.faults += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "feedback pass skipped");
                summary.faults += 1;
            }
        }

        summary
    }

    /// Loop forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.poll_once();
        }
    }

    fn send(&mut self, msg: OutboundMessage) -> bool {
        match self.transport.send(msg) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = ?e, ?msg, "send failed");
                false
            }
        }
    }

    /// The decoder state.
    #[inline]
    pub fn decoder(&self) -> &Decoder<O, S, B> {
        &self.decoder
    }

    /// Mutable access to the decoder state.
    #[inline]
    pub fn decoder_mut(&mut self) -> &mut Decoder<O, S, B> {
        &mut self.decoder
    }

    /// The bus transport.
    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the bus transport.
    #[inline]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Mutable access to the clock.
    #[inline]
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
