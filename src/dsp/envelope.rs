use crate::{graph::node::RenderCtx, MIN_TIME};

/*
Struck-Instrument Envelope
==========================

A handpan note is struck, not bowed: the level jumps up almost instantly,
then dies away for seconds while the shell rings. This envelope keeps the
classic attack/decay/sustain/release state machine but shapes the decay the
way a struck body actually loses energy.

Vocabulary
----------

  level     Current output (0.0 to 1.0), multiplied into the audio signal.

  stage     Idle, Attack, Decay, Sustain or Release.

  gate      note_on starts Attack; note_off starts Release from wherever
            the envelope currently is.

  hold      How long the gate stays high. The voice counts this in samples
            and calls note_off itself, so a note finishes on its own even if
            nobody is left to release it.


The Shape
---------

  Level
    1.0 ┐ ╱╲
        │╱  ╲_
        │     ╲__
    S   │        ╲______________
        │                        ╲
    0.0 └─────────────────────────╲──→ Time
        A   Decay (exponential)  R (linear)

Attack is a linear ramp (a few milliseconds, so only its end point matters).

Decay is EXPONENTIAL towards the sustain level. Each sample moves a fixed
fraction of the remaining distance:

    level = sustain + (level - sustain) * coeff
    coeff = exp(-DECAY_TIME_CONSTANTS / (decay_time * sample_rate))

With DECAY_TIME_CONSTANTS = 4.6 the envelope has covered 99% of the distance
after `decay_time` seconds; it then snaps to sustain.

Release is LINEAR from the level at note_off down to zero, so the voice is
guaranteed to reach exactly 0.0 after `release_time` and can be freed.


State Machine
-------------

    Idle ──note_on──> Attack ──level=1──> Decay ──≈S──> Sustain
      ^                 │                   │              │
      │                 └──────note_off─────┴──────────────┘
      │                                     │
      └──────────level=0──────────── Release

note_off is ignored while Idle. note_on always restarts from zero so that
repeated strikes are distinct.
*/

/// Number of time constants the decay covers in `decay_time` (≈ -40 dB).
const DECAY_TIME_CONSTANTS: f32 = 4.6;
/// Distance to sustain below which decay snaps to the sustain stage.
const DECAY_EPSILON: f32 = 1.0e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    stage: EnvelopeStage,
    level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    /// Build an envelope; times are in seconds, sustain in 0.0..=1.0.
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),

            stage: EnvelopeStage::Idle,
            level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Gate high: restart the attack from zero.
    pub fn note_on(&mut self, _ctx: &RenderCtx) {
        self.level = 0.0;
        self.stage = EnvelopeStage::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: ramp from the current level to zero.
    pub fn note_off(&mut self, ctx: &RenderCtx) {
        if self.stage == EnvelopeStage::Idle {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * ctx.sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeStage::Release;
    }

    /// Advance one sample.
    pub fn next_sample(&mut self, ctx: &RenderCtx) {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                self.level += 1.0 / (self.attack_time * ctx.sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                let coeff = (-DECAY_TIME_CONSTANTS / (self.decay_time * ctx.sample_rate)).exp();
                self.level = self.sustain_level + (self.level - self.sustain_level) * coeff;

                if self.level - self.sustain_level <= DECAY_EPSILON {
                    self.level = self.sustain_level;
                    self.stage = if self.sustain_level > 0.0 {
                        EnvelopeStage::Sustain
                    } else {
                        // Nothing left to hold: the strike has died away.
                        EnvelopeStage::Idle
                    };
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeStage::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);
                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
    }

    /// Render a block of envelope values.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            self.next_sample(ctx);
            *sample = self.level;
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.release_start_level = 0.0;
        self.release_elapsed_samples = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}
