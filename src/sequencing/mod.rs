//! Note lengths, tempo and timed patterns.

pub mod duration;
pub mod pattern;
pub mod tempo;

pub use duration::NoteLength;
pub use pattern::{Pattern, ScheduledNote};
pub use tempo::Bpm;
