//! Transport scheduler, control side.
//!
//! Tracks what the renderer has been asked to run (one metronome loop, one
//! pattern) so redundant requests never reach the audio thread, and learns
//! about pattern completion from the renderer's playback events. The
//! scheduling itself happens in the renderer, on the audio clock.

use tracing::{debug, info};

use crate::{
    engine::message::{Command, ControlLink, PatternId, PlaybackEvent},
    sequencing::{Bpm, Pattern},
};

/// Identifies the running metronome loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct TransportState {
    /// Some lane is using the clock.
    pub running: bool,
    /// Hidden app: the clock is held where it was.
    pub paused: bool,
    /// Tempo of the running loop, or the last one requested.
    pub bpm: Bpm,
    pub active_loop: Option<LoopHandle>,
    pub active_pattern: Option<PatternId>,
}

pub struct Transport {
    bpm: Bpm,
    active_loop: Option<LoopHandle>,
    active_pattern: Option<PatternId>,
    clock_started: bool,
    paused: bool,
    next_id: u64,
}

impl Transport {
    pub fn new(default_bpm: Bpm) -> Self {
        Self {
            bpm: default_bpm,
            active_loop: None,
            active_pattern: None,
            clock_started: false,
            paused: false,
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Start the shared clock from zero if nothing has.
    pub fn start_clock(&mut self, link: &mut ControlLink) {
        if !self.clock_started && link.send(Command::StartClock) {
            self.clock_started = true;
        }
    }

    pub fn pause_clock(&mut self, link: &mut ControlLink) {
        if !self.paused && link.send(Command::PauseClock) {
            self.paused = true;
        }
    }

    pub fn resume_clock(&mut self, link: &mut ControlLink) {
        if self.paused && link.send(Command::ResumeClock) {
            self.paused = false;
        }
    }

    /// Start (or retempo) the metronome. `bpm` is clamped to [40, 200].
    pub fn start_metronome(&mut self, link: &mut ControlLink, bpm: u32) -> Option<LoopHandle> {
        let bpm = Bpm::new(bpm);
        if self.active_loop.is_some() && bpm == self.bpm {
            return self.active_loop;
        }

        if !link.send(Command::StartMetronome { bpm }) {
            return self.active_loop;
        }
        let handle = LoopHandle(self.next_id());
        info!(%bpm, replaced = self.active_loop.is_some(), "metronome started");
        self.bpm = bpm;
        self.active_loop = Some(handle);
        self.clock_started = true;
        Some(handle)
    }

    pub fn stop_metronome(&mut self, link: &mut ControlLink) {
        if self.active_loop.is_none() {
            return;
        }
        if link.send(Command::StopMetronome) {
            info!("metronome stopped");
            self.active_loop = None;
            self.clock_started = self.active_pattern.is_some();
        }
    }

    /// Schedule `pattern`, cancelling any pattern still in flight.
    pub fn play_pattern(&mut self, link: &mut ControlLink, pattern: Pattern) -> Option<PatternId> {
        let id = PatternId(self.next_id());
        let notes = pattern.len();
        if !link.send(Command::PlayPattern {
            id,
            notes: pattern.into_notes(),
        }) {
            return None;
        }

        debug!(pattern = id.0, notes, replaced = ?self.active_pattern, "pattern scheduled");
        self.active_pattern = Some(id);
        self.clock_started = true;
        Some(id)
    }

    pub fn stop_pattern(&mut self, link: &mut ControlLink) {
        if self.active_pattern.is_none() {
            return;
        }
        if link.send(Command::StopPattern) {
            debug!("pattern stopped");
            self.active_pattern = None;
            self.clock_started = self.active_loop.is_some();
        }
    }

    /// Feed back a playback event from the renderer.
    pub fn observe(&mut self, event: &PlaybackEvent) {
        if let PlaybackEvent::PatternFinished { pattern } = *event {
            // A stale finish (from a replaced pattern) must not clear the new one.
            if self.active_pattern == Some(pattern) {
                debug!(pattern = pattern.0, "pattern finished");
                self.active_pattern = None;
                self.clock_started = self.active_loop.is_some();
            }
        }
    }

    pub fn state(&self) -> TransportState {
        TransportState {
            running: self.clock_started,
            paused: self.paused,
            bpm: self.bpm,
            active_loop: self.active_loop,
            active_pattern: self.active_pattern,
        }
    }

    /// Forget everything; the renderer it talked to is gone.
    pub fn reset(&mut self) {
        self.active_loop = None;
        self.active_pattern = None;
        self.clock_started = false;
        self.paused = false;
    }
}
