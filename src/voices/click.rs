//! Metronome click - a few milliseconds of triangle wave.
//!
//! The pitch comes from the note, so the scheduler can tell an accented
//! downbeat (higher) from the other beats.

use crate::graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode, GraphNode};

pub const ACCENT_HZ: f32 = 2_500.0;
pub const BEAT_HZ: f32 = 1_800.0;
pub const LEVEL: f32 = 0.3;

pub fn click() -> impl GraphNode {
    OscNode::triangle()
        .amplify(EnvNode::adsr(0.001, 0.03, 0.0, 0.01))
        .gain(LEVEL)
}
