use std::f32::consts::TAU;

use crate::graph::node::RenderCtx;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase-Accumulator Oscillator
============================

Phase runs from 0.0 to 1.0 and wraps. Each sample advances it by

    increment = frequency / sample_rate

and the waveform is a pure function of phase, so changing frequency between
blocks never produces a discontinuity.

    Sine      sin(2π·phase)                 drone, metronome body
    Triangle  4·|phase - 0.5| - 1, inverted  brighter click transient

Both waveforms start at zero when phase = 0, so a voice that resets its
phase on note-on never begins with a step.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Triangle,
}

pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self { waveform, phase: 0.0 }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    fn value(&self) -> f32 {
        match self.waveform {
            OscillatorWaveform::Sine => (TAU * self.phase).sin(),
            OscillatorWaveform::Triangle => {
                // Shifted by a quarter cycle so the ramp starts at zero.
                let p = (self.phase + 0.25).fract();
                1.0 - 4.0 * (p - 0.5).abs()
            }
        }
    }

    /// Fill `out` with the waveform at `ctx.frequency`.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let increment = ctx.frequency / ctx.sample_rate;
        for sample in out.iter_mut() {
            *sample = self.value();
            self.phase = (self.phase + increment).fract();
        }
    }
}
