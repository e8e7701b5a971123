//! Turnout position feedback.
//!
//! The feedback monitor reads the sensor byte once per loop iteration and
//! reports the position of every turnout whose sensors changed. The first
//! (forced) pass after startup reports every turnout. A forced pass that
//! fails on a sensor read stays pending and is completed by the next pass
//! that reads the sensors.
//!
//! # Sensor Byte
//!
//! ```text
//! bit 2*i      closed-end sensor of turnout i   (0 = contact made)
//! bit 2*i + 1  thrown-end sensor of turnout i   (0 = contact made)
//! ```
//!
//! Reporting is enabled by a configuration record holding `1`; while it is
//! anything else the monitor neither reads the sensors nor updates its
//! snapshot.
//!
//! # Example
//!
//! ```rust
//! use turnout_decoder::feedback::{FeedbackMonitor, sensor_state};
//!
//! // Turnout 0 closed contact made, turnout 1 thrown contact made.
//! let byte = 0b1111_0110;
//! assert_eq!(sensor_state(byte, 0), (true, false));
//! assert_eq!(sensor_state(byte, 1), (false, true));
//!
//! let monitor = FeedbackMonitor::new(4, 3);
//! assert_eq!(monitor.snapshot(), 0xFF);
//! ```

use crate::messages::SwitchReport;
use crate::profile::MAX_TURNOUTS;
use crate::store::ConfigStore;
use crate::traits::{ByteStore, SensorInput};
use heapless::Vec;

/// Reports produced by one feedback pass, in turnout order.
pub type Reports = Vec<SwitchReport, MAX_TURNOUTS>;

/// Snapshot value before any sensor has been read (nothing asserted).
pub const IDLE_SNAPSHOT: u8 = 0xFF;

/// Default configuration index of the feedback enable flag.
pub const DEFAULT_FLAG_INDEX: u16 = 3;

/// Decode `(closed, thrown)` of `turnout` from an active-low sensor byte.
#[inline]
pub const fn sensor_state(byte: u8, turnout: usize) -> (bool, bool) {
    let closed = byte & (1 << (turnout * 2)) == 0;
    let thrown = byte & (1 << (turnout * 2 + 1)) == 0;
    (closed, thrown)
}

/// Change detector over the sensor byte.
#[derive(Debug)]
pub struct FeedbackMonitor {
    snapshot: u8,
    inputs: usize,
    flag_index: u16,
    force_pending: bool,
}

impl FeedbackMonitor {
    /// Create a monitor for `inputs` turnouts gated by the record at `flag_index`.
    ///
    /// At most four turnouts fit in the sensor byte; larger counts are capped.
    pub fn new(inputs: usize, flag_index: u16) -> Self {
        Self {
            snapshot: IDLE_SNAPSHOT,
            inputs: inputs.min(4),
            flag_index,
            force_pending: false,
        }
    }

    /// Last sensor byte that completed a comparison pass.
    #[inline]
    pub fn snapshot(&self) -> u8 {
        self.snapshot
    }

    /// Whether a forced pass has not completed yet.
    #[inline]
    pub fn force_pending(&self) -> bool {
        self.force_pending
    }

    /// Number of turnouts monitored.
    #[inline]
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    /// Run one feedback pass.
    ///
    /// With `forced` set every monitored turnout is reported; otherwise only
    /// turnouts whose sensors differ from the snapshot. Returns an empty list
    /// when reporting is disabled or nothing changed.
    pub fn poll<S: SensorInput, B: ByteStore>(
        &mut self,
        sensor: &mut S,
        store: &ConfigStore<B>,
        forced: bool,
    ) -> Result<Reports, S::Error> {
        let mut reports = Reports::new();
        if !store.feedback_enabled(self.flag_index) {
            return Ok(reports);
        }

        let forced = forced || self.force_pending;
        self.force_pending = forced;
        let current = sensor.read_all()?;
        if !forced && current == self.snapshot {
            return Ok(reports);
        }

        let base = store.module_address();
        for turnout in 0..self.inputs {
            let now = sensor_state(current, turnout);
            let before = sensor_state(self.snapshot, turnout);
            if forced || now != before {
                let report = SwitchReport {
                    address: base.wrapping_add(turnout as u16),
                    closed: now.0,
                    thrown: now.1,
                };
                tracing::debug!(turnout, address = report.address, closed = now.0, thrown = now.1, "position changed");
                // inputs <= 4 <= MAX_TURNOUTS, so the push cannot overflow
                let _ = reports.push(report);
            }
        }

        self.snapshot = current;
        self.force_pending = false;
        Ok(reports)
    }
}
