//! Engine tunables.
//!
//! Everything here has a sensible default; a TOML file only needs the keys
//! it wants to change:
//!
//! ```toml
//! polyphony = 24
//! volume_db = -12.0
//! default_bpm = 96
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sequencing::Bpm;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Handpan voices in the pool.
    pub polyphony: usize,
    /// Initial master volume in dB, clamped like `set_volume`.
    pub volume_db: f32,
    /// Tempo the metronome starts at when none is given.
    pub default_bpm: u32,
    /// Beats per bar; the first of each bar is accented.
    pub beats_per_bar: u32,
    /// Sustained level of the drone voice.
    pub drone_level: f32,
    /// Control to audio command ring size.
    pub command_capacity: usize,
    /// Audio to control event ring size.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            polyphony: 16,
            volume_db: -6.0,
            default_bpm: 80,
            beats_per_bar: 4,
            drone_level: 0.15,
            command_capacity: 1024,
            event_capacity: 1024,
        }
    }
}

impl EngineConfig {
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> crate::Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn default_bpm(&self) -> Bpm {
        Bpm::new(self.default_bpm)
    }

    /// Copy with every field forced into its usable range.
    pub fn sanitized(&self) -> Self {
        Self {
            polyphony: self.polyphony.max(1),
            volume_db: self.volume_db,
            default_bpm: Bpm::new(self.default_bpm).get(),
            beats_per_bar: self.beats_per_bar.max(1),
            drone_level: self.drone_level.clamp(0.0, 1.0),
            command_capacity: self.command_capacity.max(16),
            event_capacity: self.event_capacity.max(16),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_fixes_degenerate_values() {
        let config = EngineConfig {
            polyphony: 0,
            default_bpm: 1_000,
            beats_per_bar: 0,
            drone_level: 4.0,
            command_capacity: 0,
            ..EngineConfig::default()
        }
        .sanitized();

        assert_eq!(config.polyphony, 1);
        assert_eq!(config.default_bpm, 200);
        assert_eq!(config.beats_per_bar, 1);
        assert_eq!(config.drone_level, 1.0);
        assert_eq!(config.command_capacity, 16);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("polyphony = 24\nvolume_db = -12.0\n").unwrap();
        assert_eq!(config.polyphony, 24);
        assert_eq!(config.volume_db, -12.0);
        assert_eq!(config.default_bpm, 80);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn unknown_keys_are_rejected() {
        let err = EngineConfig::from_toml_str("polyfony = 24").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
