//! Voice management and polyphony.
//!
//! This layer sits above graph nodes: a `Voice` gives one graph a note
//! lifecycle, a `PolySynth` owns a fixed pool of them.

pub mod factory;
pub mod poly;
pub mod voice;

pub use factory::VoiceFactory;
pub use poly::PolySynth;
pub use voice::{Voice, VoiceState};
