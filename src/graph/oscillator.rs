use crate::dsp::oscillator::OscillatorBlock;
use crate::graph::node::{GraphNode, RenderCtx};

/*
Audio Oscillator
================

An oscillator is the raw sound source: a repeating waveform at a pitch,
shaped afterwards by envelopes.

Waveforms used by the instrument:
---------------------------------

Sine: a single frequency with no harmonics.
  - Sound: smooth, hollow
  - Use: the drone, which should sit under the handpan without colouring it

Triangle: odd harmonics falling off as 1/n².
  - Sound: soft but with enough edge to cut through
  - Use: the metronome click, a few milliseconds long

By default the oscillator follows `ctx.frequency`, i.e. the pitch the voice
was started with. `with_frequency` pins it instead, for sounds that should
ignore the note.

Example usage:
  let drone = OscNode::sine().amplify(EnvNode::adsr(0.05, 0.0, 1.0, 0.25));
  let click = OscNode::triangle().amplify(EnvNode::adsr(0.001, 0.03, 0.0, 0.01));
*/

pub struct OscNode {
    osc: OscillatorBlock,
    /// Fixed frequency (Hz). If Some, ignores ctx.frequency and uses this instead.
    fixed_frequency: Option<f32>,
}

impl OscNode {
    fn new(osc: OscillatorBlock) -> Self {
        Self {
            osc,
            fixed_frequency: None,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorBlock::sine())
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorBlock::triangle())
    }

    /// Set a fixed frequency, ignoring the note pitch from RenderCtx.
    pub fn with_frequency(mut self, freq: f32) -> Self {
        self.fixed_frequency = Some(freq);
        self
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let ctx = RenderCtx {
            frequency: self.fixed_frequency.unwrap_or(ctx.frequency),
            ..*ctx
        };
        self.osc.render(out, &ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        // Every strike starts at a zero crossing.
        self.osc.reset_phase();
    }

    fn reset(&mut self) {
        self.osc.reset_phase();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn follows_context_frequency() {
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::from_freq(sample_rate, 432.0, 1.0);
        let mut osc = OscNode::sine();

        let mut buffer = vec![0.0f32; 128];
        osc.render_block(&mut buffer, &ctx);

        let sample_index = 12;
        let expected = (TAU * 432.0 * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn fixed_frequency_ignores_note() {
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::from_freq(sample_rate, 432.0, 1.0);
        let mut pinned = OscNode::sine().with_frequency(1_000.0);

        let mut buffer = vec![0.0f32; 64];
        pinned.render_block(&mut buffer, &ctx);

        let expected = (TAU * 1_000.0 * 10.0 / sample_rate).sin();
        assert!((buffer[10] - expected).abs() < 1e-4);
    }
}
