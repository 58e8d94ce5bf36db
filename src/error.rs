//! Error types shared by every layer of the engine.
//!
//! Two families live here. `Error` covers platform failures (the audio
//! context or synthesis graph could not be created, a device call failed)
//! and wraps `ValidationError`, which is raised synchronously at the call
//! boundary for structurally invalid requests. Nothing in this crate logs
//! and swallows an error; failures go back to the caller, who decides how
//! to surface a retry.

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The synthesis graph could not be built or attached to the context.
    #[error("audio engine initialization failed: {0}")]
    AudioInit(String),

    /// The platform refused to create an audio context.
    #[error("audio context could not be created: {0}")]
    ContextInit(String),

    /// An existing context failed to resume, suspend or play.
    #[error("audio device error: {0}")]
    Device(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[cfg(feature = "serde")]
    #[error("invalid engine configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Platform failures can be retried on the next user gesture.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::AudioInit(_) | Error::ContextInit(_) | Error::Device(_)
        )
    }
}

/// A request rejected before it reached the audio thread.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown note name `{0}`")]
    UnknownNote(String),

    #[error("frequency must be a positive, finite number of Hz (got {0})")]
    InvalidFrequency(f32),

    #[error("pattern has {notes} notes but {offsets} offsets")]
    LengthMismatch { notes: usize, offsets: usize },

    #[error("pattern offset #{index} is negative ({offset_ms} ms)")]
    NegativeOffset { index: usize, offset_ms: i64 },

    #[error("pattern offset #{index} ({offset_ms} ms) is earlier than the one before it")]
    DecreasingOffset { index: usize, offset_ms: i64 },

    #[error("pattern contains no notes")]
    EmptyPattern,

    #[error("note `{0}` appears more than once in the tuning table")]
    DuplicateNote(String),

    #[error("chord `{chord}` references unknown note `{note}`")]
    UnknownChordNote { chord: String, note: String },

    #[error("unknown note length `{0}` (expected short, medium or long)")]
    UnknownNoteLength(String),
}

/// Reject frequencies that would produce undefined audio.
pub(crate) fn check_frequency(frequency_hz: f32) -> std::result::Result<f32, ValidationError> {
    if frequency_hz.is_finite() && frequency_hz > 0.0 {
        Ok(frequency_hz)
    } else {
        Err(ValidationError::InvalidFrequency(frequency_hz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_failures_are_retryable() {
        assert!(Error::AudioInit("denied".into()).is_retryable());
        assert!(Error::ContextInit("denied".into()).is_retryable());
        assert!(!Error::from(ValidationError::EmptyPattern).is_retryable());
    }

    #[test]
    fn frequency_check_rejects_non_positive_values() {
        assert_eq!(check_frequency(432.0), Ok(432.0));
        assert_eq!(
            check_frequency(0.0),
            Err(ValidationError::InvalidFrequency(0.0))
        );
        assert!(check_frequency(-1.0).is_err());
        assert!(check_frequency(f32::NAN).is_err());
        assert!(check_frequency(f32::INFINITY).is_err());
    }
}
