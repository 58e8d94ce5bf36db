use crate::graph::node::{GraphNode, RenderCtx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Playing, envelope in attack/decay/sustain
    Releasing, // Hold elapsed, envelope in release phase
}

/// A single voice that can play any GraphNode
///
/// The voice counts its own hold time in samples and releases itself on the
/// exact sample the hold ends, so a note always finishes on the audio thread
/// whether or not anyone on the control side is still around.
pub struct Voice<T: GraphNode> {
    frequency: f32,
    velocity: f32,
    state: VoiceState,
    age: u64,
    sample_rate: f32,
    /// Samples left before note_off; `None` holds until `release()`.
    hold_remaining: Option<u64>,
    graph: T,
}

impl<T: GraphNode> Voice<T> {
    pub fn new(graph: T, sample_rate: f32) -> Self {
        Self {
            frequency: 0.0,
            velocity: 0.0,
            state: VoiceState::Free,
            age: 0,
            sample_rate,
            hold_remaining: None,
            graph,
        }
    }

    fn ctx(&self) -> RenderCtx {
        RenderCtx::from_freq(self.sample_rate, self.frequency, self.velocity)
    }

    pub fn start(&mut self, frequency: f32, velocity: f32, hold: Option<u64>, age: u64) {
        self.frequency = frequency;
        self.velocity = velocity.clamp(0.0, 1.0);
        self.state = VoiceState::Active;
        self.age = age;
        self.hold_remaining = hold;

        let ctx = self.ctx();
        self.graph.note_on(&ctx);
    }

    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.hold_remaining = None;

            let ctx = self.ctx();
            self.graph.note_off(&ctx);
        }
    }

    /// Silence immediately, skipping the release tail.
    pub fn hard_stop(&mut self) {
        self.graph.reset();
        self.free();
    }

    /// Render into `out` (overwrites).
    pub fn render(&mut self, out: &mut [f32]) {
        let ctx = self.ctx();

        match self.hold_remaining {
            Some(remaining) if self.state == VoiceState::Active && remaining < out.len() as u64 => {
                // Release lands inside this block: split at that sample.
                let (held, released) = out.split_at_mut(remaining as usize);
                self.graph.render_block(held, &ctx);
                self.release();
                self.graph.render_block(released, &ctx);
            }
            Some(remaining) => {
                self.hold_remaining = Some(remaining - out.len() as u64);
                self.graph.render_block(out, &ctx);
            }
            None => self.graph.render_block(out, &ctx),
        }

        for sample in out.iter_mut() {
            *sample *= self.velocity;
        }

        // Struck envelopes can die away before the hold ends.
        if !self.graph.is_active() {
            self.free();
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn get_envelope_level(&self) -> Option<f32> {
        self.graph.get_envelope_level()
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.hold_remaining = None;
        self.frequency = 0.0;
        self.velocity = 0.0;
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode};

    fn voice() -> Voice<impl GraphNode> {
        Voice::new(
            OscNode::sine().amplify(EnvNode::adsr(0.001, 0.1, 0.5, 0.1)),
            1_000.0,
        )
    }

    #[test]
    fn releases_on_the_exact_hold_sample() {
        let mut voice = voice();
        voice.start(100.0, 1.0, Some(30), 0);

        let mut buffer = vec![0.0f32; 20];
        voice.render(&mut buffer);
        assert_eq!(voice.state(), VoiceState::Active);

        voice.render(&mut buffer);
        assert_eq!(voice.state(), VoiceState::Releasing);
    }

    #[test]
    fn frees_itself_after_the_release_tail() {
        let mut voice = voice();
        voice.start(100.0, 1.0, Some(10), 0);

        let mut buffer = vec![0.0f32; 200];
        voice.render(&mut buffer);
        assert!(voice.is_free());
    }

    #[test]
    fn unbounded_hold_waits_for_release() {
        let mut voice = voice();
        voice.start(100.0, 1.0, None, 0);

        let mut buffer = vec![0.0f32; 500];
        voice.render(&mut buffer);
        assert_eq!(voice.state(), VoiceState::Active);

        voice.release();
        voice.render(&mut buffer);
        assert!(voice.is_free());
    }

    #[test]
    fn hard_stop_frees_without_tail() {
        let mut voice = voice();
        voice.start(100.0, 1.0, None, 0);
        voice.hard_stop();
        assert!(voice.is_free());

        let mut buffer = vec![1.0f32; 16];
        voice.render(&mut buffer);
        assert!(buffer.iter().all(|s| *s == 0.0));
    }
}
