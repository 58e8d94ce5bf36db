//! Drone voice - a steady sine under the instrument.
//!
//! Short fade in, full sustain for as long as the drone runs, short fade
//! out on stop. `level` is the sustained output level.

use crate::graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode, GraphNode};

pub const ATTACK_SECONDS: f32 = 0.05;
pub const RELEASE_SECONDS: f32 = 0.25;

pub fn drone(level: f32) -> impl GraphNode {
    OscNode::sine()
        .amplify(EnvNode::adsr(ATTACK_SECONDS, 0.0, 1.0, RELEASE_SECONDS))
        .gain(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RenderCtx;

    #[test]
    fn sustains_until_released() {
        let ctx = RenderCtx::from_freq(1_000.0, 100.0, 1.0);
        let mut voice = drone(0.15);
        voice.note_on(&ctx);

        let mut buffer = vec![0.0f32; 5_000];
        voice.render_block(&mut buffer, &ctx);
        assert!(voice.is_active());
        let peak = buffer[4_000..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.15).abs() < 0.01);

        voice.note_off(&ctx);
        voice.render_block(&mut buffer[..300], &ctx);
        assert!(!voice.is_active());
    }
}
