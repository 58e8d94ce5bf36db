/*
Handpan Engine
==============

`HandpanEngine` is the one object a UI talks to. It composes:

    AudioSession     context + gesture unlock + background handling
    ToneEngine       bell voices and master volume (owns the command link)
    Transport        metronome and pattern lanes
    DroneController  the sustained tone

Everything audible happens in the `Renderer` on the audio thread; the
components above only validate requests and send commands. The transport
and the drone borrow the tone engine's link for each call; nothing but the
session touches the context.

Readiness
---------

Play-style calls validate their arguments first (so bad input is always
reported) and then do nothing until the engine is ready: initialized,
unlocked and running. Lifecycle calls (`initialize`, `unlock`, `dispose`)
are idempotent.

    let mut engine = HandpanEngine::new(
        Box::new(CpalHost::new()),
        Box::new(NativeProbe),
        EngineConfig::default(),
    );
    engine.initialize()?;
    // inside the first key press / tap:
    engine.unlock()?;
    engine.play_named_note("D3", NoteLength::Medium)?;
*/

pub mod clock;
pub mod drone;
pub mod event_queue;
pub mod message;
pub mod renderer;
pub mod scheduler;
pub mod tone;

pub use drone::{DroneController, DroneState};
pub use message::{PatternId, PlaybackEvent};
pub use scheduler::{LoopHandle, Transport, TransportState};
pub use tone::{EngineState, ToneEngine};

use tracing::debug;

use crate::{
    config::EngineConfig,
    error::{check_frequency, Result},
    platform::{AudioHost, CapabilityProbe},
    sequencing::{Bpm, NoteLength, Pattern},
    session::{AudioSession, UnlockOutcome},
    tuning::{ChordDefinition, FrequencyTable},
};

pub struct HandpanEngine {
    session: AudioSession,
    tone: ToneEngine,
    transport: Transport,
    drone: DroneController,
    table: FrequencyTable,
}

impl HandpanEngine {
    pub fn new(
        host: Box<dyn AudioHost>,
        probe: Box<dyn CapabilityProbe>,
        config: EngineConfig,
    ) -> Self {
        Self::with_table(host, probe, config, FrequencyTable::d_kurd_432())
    }

    pub fn with_table(
        host: Box<dyn AudioHost>,
        probe: Box<dyn CapabilityProbe>,
        config: EngineConfig,
        table: FrequencyTable,
    ) -> Self {
        let bpm = config.default_bpm();
        Self {
            session: AudioSession::new(host, probe),
            tone: ToneEngine::new(config),
            transport: Transport::new(bpm),
            drone: DroneController::new(),
            table,
        }
    }

    /// Create the audio context and the synthesizer. Idempotent.
    pub fn initialize(&mut self) -> Result<()> {
        let context = self.session.initialize_context()?;
        self.tone.initialize(context)
    }

    /// Complete the gesture unlock. Call from inside a user gesture.
    pub fn unlock(&mut self) -> Result<()> {
        self.initialize()?;
        let outcome = self.session.unlock()?;

        if outcome == UnlockOutcome::Unlocked {
            if let Some(link) = self.tone.link_mut() {
                self.transport.start_clock(link);
            }
        }
        Ok(())
    }

    /// Run `callback` once audio is unlocked.
    pub fn on_unlock(&mut self, callback: impl FnOnce() + 'static) {
        self.session.on_unlock(callback);
    }

    pub fn is_ready(&self) -> bool {
        self.tone.is_ready() && self.session.is_ready()
    }

    pub fn play_note(&mut self, frequency_hz: f32, length: NoteLength) -> Result<()> {
        check_frequency(frequency_hz)?;
        if !self.gate("play_note") {
            return Ok(());
        }
        self.tone.play_note(frequency_hz, length)
    }

    pub fn play_named_note(&mut self, name: &str, length: NoteLength) -> Result<()> {
        let frequency = self.table.frequency(name)?;
        self.play_note(frequency, length)
    }

    pub fn play_chord(&mut self, frequencies: &[f32], length: NoteLength) -> Result<()> {
        for &frequency in frequencies {
            check_frequency(frequency)?;
        }
        if !self.gate("play_chord") {
            return Ok(());
        }
        self.tone.play_chord(frequencies, length)
    }

    pub fn play_chord_pad(&mut self, chord: &ChordDefinition, length: NoteLength) -> Result<()> {
        let frequencies = chord.frequencies(&self.table)?;
        self.play_chord(&frequencies, length)
    }

    pub fn start_metronome(&mut self, bpm: u32) -> Option<LoopHandle> {
        if !self.gate("start_metronome") {
            return None;
        }
        let link = self.tone.link_mut()?;
        self.transport.start_metronome(link, bpm)
    }

    pub fn stop_metronome(&mut self) {
        if let Some(link) = self.tone.link_mut() {
            self.transport.stop_metronome(link);
        }
    }

    /// Schedule a pattern of note names at millisecond offsets.
    ///
    /// Returns `None` when the engine is not ready (nothing scheduled).
    pub fn play_pattern(&mut self, notes: &[&str], offsets_ms: &[i64]) -> Result<Option<PatternId>> {
        let pattern = Pattern::new(&self.table, notes, offsets_ms)?;
        if !self.gate("play_pattern") {
            return Ok(None);
        }
        let Some(link) = self.tone.link_mut() else {
            return Ok(None);
        };
        Ok(self.transport.play_pattern(link, pattern))
    }

    pub fn stop_pattern(&mut self) {
        if let Some(link) = self.tone.link_mut() {
            self.transport.stop_pattern(link);
        }
    }

    pub fn start_drone(&mut self, frequency_hz: f32) -> Result<()> {
        check_frequency(frequency_hz)?;
        if !self.gate("start_drone") {
            return Ok(());
        }
        if let Some(link) = self.tone.link_mut() {
            self.drone.start(link, frequency_hz)?;
        }
        Ok(())
    }

    pub fn stop_drone(&mut self) {
        if let Some(link) = self.tone.link_mut() {
            self.drone.stop(link);
        }
    }

    /// Master volume in dB, clamped to [-40, 0].
    pub fn set_volume(&mut self, relative_db: f32) {
        self.tone.set_volume(relative_db);
    }

    pub fn volume_db(&self) -> f32 {
        self.tone.volume_db()
    }

    /// Suspend audio while hidden, pick up where it was when shown.
    pub fn handle_visibility_change(&mut self, visible: bool) -> Result<()> {
        if visible {
            self.session.resume_from_background()?;
            if let Some(link) = self.tone.link_mut() {
                self.transport.resume_clock(link);
            }
        } else {
            if let Some(link) = self.tone.link_mut() {
                self.transport.pause_clock(link);
            }
            self.session.suspend_for_background()?;
        }
        Ok(())
    }

    /// Playback events since the last call. Keeps the transport in sync, so
    /// call it regularly (once per UI frame).
    pub fn poll_events(&mut self) -> Vec<PlaybackEvent> {
        let Some(link) = self.tone.link_mut() else {
            return Vec::new();
        };
        let events = link.drain();
        for event in &events {
            self.transport.observe(event);
        }
        events
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn drone_state(&self) -> DroneState {
        self.drone.state()
    }

    pub fn engine_state(&self) -> EngineState {
        self.tone.state()
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    pub fn default_bpm(&self) -> Bpm {
        self.tone.config().default_bpm()
    }

    /// Stop everything and release the audio context. `initialize` and
    /// `unlock` bring the engine back.
    pub fn dispose(&mut self) -> Result<()> {
        self.transport.reset();
        self.drone.reset();
        self.tone.dispose(self.session.context_mut());
        self.session.dispose()
    }

    fn gate(&self, call: &str) -> bool {
        let ready = self.is_ready();
        if !ready {
            debug!(call, "engine not ready, ignoring");
        }
        ready
    }
}
