use std::f32::consts::TAU;

/*
Two-Operator FM
===============

Frequency modulation makes the metallic, inharmonic-sounding partials of a
struck steel shell from just two sine oscillators:

    modulator(t) = sin(2π · fm · t)
    output(t)    = sin(2π · fc · t + index · modulator(t))

    fc     carrier frequency (the pitch you hear)
    fm     modulator frequency = fc · harmonicity
    index  modulation index: how far the carrier's phase is pushed around

The output contains partials at fc ± n·fm with amplitudes given by Bessel
functions J_n(index). With harmonicity 2 the partials land on the odd
harmonics (fc, 3fc, 5fc...), which reads as a bell. Small indices keep the
fundamental dominant; large ones smear energy into the upper partials.

Handpan brightness lives in the first instants of the strike, so the voice
drives `index` from its own fast-decaying envelope: the note starts bright
and melts into an almost pure tone.
*/

pub struct FmOperator {
    harmonicity: f32,
    carrier_phase: f32,
    modulator_phase: f32,
}

impl FmOperator {
    pub fn new(harmonicity: f32) -> Self {
        Self {
            harmonicity: harmonicity.max(0.0),
            carrier_phase: 0.0,
            modulator_phase: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.carrier_phase = 0.0;
        self.modulator_phase = 0.0;
    }

    /// One output sample at `frequency` with modulation depth `index`.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32, index: f32) -> f32 {
        let modulator = (TAU * self.modulator_phase).sin();
        let out = (TAU * self.carrier_phase + index * modulator).sin();

        let increment = frequency / sample_rate;
        self.carrier_phase = (self.carrier_phase + increment).fract();
        self.modulator_phase = (self.modulator_phase + increment * self.harmonicity).fract();

        out
    }
}
