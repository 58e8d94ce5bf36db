use crate::{
    graph::node::GraphNode,
    synth::{
        factory::VoiceFactory,
        voice::{Voice, VoiceState},
    },
    MAX_BLOCK_SIZE,
};

/// Fixed pool of voices built from one factory.
///
/// Voices are created up front so the audio thread never allocates. Each
/// `note_on` gets its own voice; simultaneous strikes of the same pitch are
/// separate voices, exactly like hitting a tone field twice.
pub struct PolySynth<T: GraphNode> {
    voices: Vec<Voice<T>>,
    temp_buffer: Vec<f32>,
    next_age: u64,
}

impl<T: GraphNode> PolySynth<T> {
    pub fn new<F>(factory: &F, max_voices: usize, sample_rate: f32) -> Self
    where
        F: VoiceFactory<Voice = T>,
    {
        let voices = (0..max_voices.max(1))
            .map(|_| Voice::new(factory.create_voice(), sample_rate))
            .collect();

        Self {
            voices,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
            next_age: 0,
        }
    }

    /// Start a voice. `hold` is in samples; `None` sustains until released.
    pub fn note_on(&mut self, frequency: f32, velocity: f32, hold: Option<u64>) {
        let age = self.next_age;
        self.next_age += 1;

        let voice = self.allocate_voice();
        voice.start(frequency, velocity, hold, age);
    }

    /// Mix all sounding voices into `out` (overwrites).
    pub fn render_block(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        for voice in &mut self.voices {
            if voice.is_active() {
                let frames = &mut self.temp_buffer[..out.len()];
                voice.render(frames);

                for (o, v) in out.iter_mut().zip(frames.iter()) {
                    *o += v;
                }
            }
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Frequencies of the voices currently sounding.
    pub fn sounding_frequencies(&self) -> impl Iterator<Item = f32> + '_ {
        self.voices
            .iter()
            .filter(|v| v.is_active())
            .map(|v| v.frequency())
    }

    fn allocate_voice(&mut self) -> &mut Voice<T> {
        // First pass: find free voice index
        let free_idx = self.voices.iter().position(|v| v.is_free());

        // Second pass: steal oldest releasing voice
        let steal_idx = free_idx.or_else(|| {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, v)| v.state() == VoiceState::Releasing)
                .min_by_key(|(_, v)| v.age())
                .map(|(idx, _)| idx)
        });

        // Third pass: the pool is saturated with held notes, steal the oldest
        let idx = steal_idx.unwrap_or_else(|| {
            self.voices
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| v.age())
                .map(|(idx, _)| idx)
                .unwrap_or(0)
        });

        &mut self.voices[idx]
    }
}
