//! Decoder firmware configuration.
//!
//! These settings are fixed when the firmware is built or the decoder is
//! constructed. Everything that can change at runtime (module address,
//! drive types, pulse lengths) lives in the configuration records instead,
//! see [`crate::store`].
//!
//! # Example
//!
//! ```rust
//! use turnout_decoder::config::DecoderConfig;
//! use turnout_decoder::profile::HardwareProfile;
//!
//! // Use defaults
//! let config = DecoderConfig::default();
//! assert_eq!(config.article_number, 5030);
//!
//! // Or customize
//! let config = DecoderConfig::default()
//!     .with_profile(HardwareProfile::Wide)
//!     .with_article_number(5031);
//! assert_eq!(config.turnout_count(), 8);
//! ```

use crate::feedback::DEFAULT_FLAG_INDEX;
use crate::profile::HardwareProfile;

/// Article number this decoder type answers to during programming.
pub const DEFAULT_ARTICLE_NUMBER: u16 = 5030;

/// I2C address of the PCF8574 sensor expander.
pub const DEFAULT_EXPANDER_ADDRESS: u8 = 0x38;

/// Complete decoder configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecoderConfig {
    /// Article number matched by programming requests
    pub article_number: u16,
    /// Hardware profile (turnout count, pins, feedback)
    pub profile: HardwareProfile,
    /// I2C address of the sensor expander
    pub expander_address: u8,
    /// Configuration index of the feedback enable flag
    pub feedback_flag_index: u16,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            article_number: DEFAULT_ARTICLE_NUMBER,
            profile: HardwareProfile::BUILD,
            expander_address: DEFAULT_EXPANDER_ADDRESS,
            feedback_flag_index: DEFAULT_FLAG_INDEX,
        }
    }
}

impl DecoderConfig {
    /// Set the article number
    pub fn with_article_number(mut self, article: u16) -> Self {
        self.article_number = article;
        self
    }

    /// Set the hardware profile
    pub fn with_profile(mut self, profile: HardwareProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the sensor expander I2C address
    pub fn with_expander_address(mut self, address: u8) -> Self {
        self.expander_address = address;
        self
    }

    /// Set the feedback enable flag index
    pub fn with_feedback_flag_index(mut self, index: u16) -> Self {
        self.feedback_flag_index = index;
        self
    }

    /// Number of turnouts driven by the configured profile
    pub fn turnout_count(&self) -> usize {
        self.profile.turnout_count()
    }

    /// Bytes of persistent storage the configuration records occupy
    pub fn storage_bytes(&self) -> usize {
        crate::store::record_count(self.turnout_count()) as usize * 2
    }
}
