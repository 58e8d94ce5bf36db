use std::{fmt, str::FromStr, time::Duration};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How long a struck note is held before its envelope releases.
///
/// The release tail comes on top of this, so a `Short` note is audible for
/// its 300ms hold plus the voice's release time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteLength {
    #[default]
    Short,
    Medium,
    Long,
}

impl NoteLength {
    pub const fn hold(self) -> Duration {
        match self {
            NoteLength::Short => Duration::from_millis(300),
            NoteLength::Medium => Duration::from_millis(800),
            NoteLength::Long => Duration::from_secs(2),
        }
    }

    /// Hold time in whole samples at `sample_rate`.
    pub fn hold_frames(self, sample_rate: f32) -> u64 {
        duration_to_frames(self.hold(), sample_rate)
    }
}

/// Convert wall time to a sample count, rounding to the nearest frame.
pub fn duration_to_frames(duration: Duration, sample_rate: f32) -> u64 {
    (duration.as_secs_f64() * sample_rate as f64).round() as u64
}

impl FromStr for NoteLength {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(NoteLength::Short),
            "medium" => Ok(NoteLength::Medium),
            "long" => Ok(NoteLength::Long),
            _ => Err(ValidationError::UnknownNoteLength(s.to_string())),
        }
    }
}

impl fmt::Display for NoteLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoteLength::Short => "short",
            NoteLength::Medium => "medium",
            NoteLength::Long => "long",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_times() {
        assert_eq!(NoteLength::Short.hold(), Duration::from_millis(300));
        assert_eq!(NoteLength::Medium.hold(), Duration::from_millis(800));
        assert_eq!(NoteLength::Long.hold(), Duration::from_secs(2));
        assert_eq!(NoteLength::Short.hold_frames(48_000.0), 14_400);
        assert_eq!(NoteLength::Long.hold_frames(44_100.0), 88_200);
    }

    #[test]
    fn parses_tokens() {
        assert_eq!("short".parse::<NoteLength>(), Ok(NoteLength::Short));
        assert_eq!(" Long ".parse::<NoteLength>(), Ok(NoteLength::Long));
        assert_eq!(
            "8n".parse::<NoteLength>(),
            Err(ValidationError::UnknownNoteLength("8n".into()))
        );
        assert_eq!(NoteLength::Medium.to_string(), "medium");
    }
}
