//! Hardware profiles.
//!
//! A profile fixes the turnout count, the output pin for every channel and
//! whether position feedback hardware is fitted. It is chosen once when the
//! decoder is built; the `wide` cargo feature selects which profile
//! [`HardwareProfile::BUILD`] refers to.
//!
//! | Profile | Turnouts | Feedback |
//! |---------|----------|----------|
//! | [`Sensor`](HardwareProfile::Sensor) | 4 | PCF8574 expander |
//! | [`Wide`](HardwareProfile::Wide) | 8 | none |
//!
//! # Example
//!
//! ```rust
//! use turnout_decoder::profile::HardwareProfile;
//!
//! let profile = HardwareProfile::Sensor;
//! assert_eq!(profile.turnout_count(), 4);
//! assert_eq!(profile.closed_pin(0), 2);
//! assert_eq!(profile.thrown_pin(0), 3);
//! assert!(profile.has_feedback());
//! ```

/// Largest turnout count of any profile.
pub const MAX_TURNOUTS: usize = 8;

/// Largest output channel count of any profile (two per turnout).
pub const MAX_CHANNELS: usize = MAX_TURNOUTS * 2;

/// Output pins of the sensor profile, closed/thrown per turnout.
const SENSOR_PINS: [u8; 8] = [2, 3, 4, 5, 6, 9, 10, 11];

/// Output pins of the wide profile. 14..=19 are the analog header pins
/// A0..A5 used as digital outputs.
const WIDE_PINS: [u8; 16] = [2, 3, 4, 5, 6, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19];

/// Build-time hardware variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HardwareProfile {
    /// Four turnouts with position sensors on an I2C expander.
    Sensor,
    /// Eight turnouts, no feedback inputs.
    Wide,
}

impl HardwareProfile {
    /// Profile selected by the cargo features of this build.
    #[cfg(not(feature = "wide"))]
    pub const BUILD: HardwareProfile = HardwareProfile::Sensor;

    /// Profile selected by the cargo features of this build.
    #[cfg(feature = "wide")]
    pub const BUILD: HardwareProfile = HardwareProfile::Wide;

    /// Number of turnouts driven.
    #[inline]
    pub const fn turnout_count(&self) -> usize {
        self.pins().len() / 2
    }

    /// Number of output channels (two per turnout).
    #[inline]
    pub const fn channel_count(&self) -> usize {
        self.pins().len()
    }

    /// Output pin of every channel, indexed by channel.
    #[inline]
    pub const fn pins(&self) -> &'static [u8] {
        match self {
            HardwareProfile::Sensor => &SENSOR_PINS,
            HardwareProfile::Wide => &WIDE_PINS,
        }
    }

    /// Pin driving the closed end of `turnout`.
    #[inline]
    pub const fn closed_pin(&self, turnout: usize) -> u8 {
        self.pins()[turnout * 2]
    }

    /// Pin driving the thrown end of `turnout`.
    #[inline]
    pub const fn thrown_pin(&self, turnout: usize) -> u8 {
        self.pins()[turnout * 2 + 1]
    }

    /// Whether position feedback hardware is fitted.
    #[inline]
    pub const fn has_feedback(&self) -> bool {
        matches!(self, HardwareProfile::Sensor)
    }

    /// Returns the profile name as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            HardwareProfile::Sensor => "sensor",
            HardwareProfile::Wide => "wide",
        }
    }

    /// Parse a profile name (`"sensor"`/`"0"` or `"wide"`/`"1"`).
    ///
    /// ```
    /// use turnout_decoder::profile::HardwareProfile;
    ///
    /// assert_eq!(HardwareProfile::from_text("wide"), Some(HardwareProfile::Wide));
    /// assert_eq!(HardwareProfile::from_text(" 0 "), Some(HardwareProfile::Sensor));
    /// assert_eq!(HardwareProfile::from_text("2"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim() {
            t if t.eq_ignore_ascii_case("sensor") || t == "0" => Some(HardwareProfile::Sensor),
            t if t.eq_ignore_ascii_case("wide") || t == "1" => Some(HardwareProfile::Wide),
            _ => None,
        }
    }
}

impl Default for HardwareProfile {
    fn default() -> Self {
        Self::BUILD
    }
}
