//! Handpan synthesis and playback engine.
//!
//! Layers, bottom up:
//!
//! - [`tuning`]: the instrument's notes and chord pads
//! - [`dsp`] and [`graph`]: oscillators, FM, envelopes and composable nodes
//! - [`synth`] and [`voices`]: voice lifecycle, polyphony and the presets
//! - [`engine`]: the renderer on the audio thread and its control side
//! - [`platform`] and [`session`]: audio contexts and the gesture unlock
//!
//! [`HandpanEngine`] ties them together.

pub mod analysis;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod graph;
pub mod platform;
pub mod sequencing;
pub mod session;
pub mod synth;
pub mod tuning;
pub mod voices;

pub use config::EngineConfig;
pub use engine::{HandpanEngine, PatternId, PlaybackEvent};
pub use error::{Error, Result, ValidationError};
pub use sequencing::NoteLength;

/// Largest block any node renders in one call.
pub const MAX_BLOCK_SIZE: usize = 2048;
/// Shortest envelope stage, in seconds (one sample at 48 kHz).
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
