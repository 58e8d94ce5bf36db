//! Handpan voice - a struck steel tone field.
//!
//! # How It Works
//!
//! 1. Two-operator FM, modulator at twice the carrier, for the bell-like
//!    odd partials of a struck shell
//! 2. The modulation index has its own fast envelope (350ms decay), so the
//!    strike starts bright and melts into an almost pure tone
//! 3. Amplitude: 2ms attack, long exponential decay (1.2s) towards a low
//!    sustain, 0.8s release once the hold ends
//! 4. Fixed output level leaves headroom for a full chord plus drone
//!
//! # Variations
//!
//! - Higher peak index = harder mallet, more metallic
//! - Harmonicity 3.5 = inharmonic, gong-like
//! - Longer amplitude decay = bigger, more resonant shell

use crate::{
    dsp::envelope::Envelope,
    graph::{envelope::EnvNode, extensions::NodeExt, fm::FmNode, GraphNode},
};

pub const HARMONICITY: f32 = 2.0;
pub const PEAK_INDEX: f32 = 1.0;
pub const LEVEL: f32 = 0.28;

/// Longest the voice rings after note_off, in seconds.
pub const RELEASE_SECONDS: f32 = 0.8;

/// Create a handpan voice. Responds to note pitch.
pub fn handpan() -> impl GraphNode {
    FmNode::new(
        HARMONICITY,
        PEAK_INDEX,
        Envelope::adsr(0.001, 0.35, 0.0, 0.1),
    )
    .amplify(EnvNode::adsr(0.002, 1.2, 0.12, RELEASE_SECONDS))
    .gain(LEVEL)
}
