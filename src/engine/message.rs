//! Traffic between the control thread and the renderer.
//!
//! Commands flow control → audio, playback events flow audio → control,
//! each through its own lock-free SPSC ring. A third ring carries pattern
//! buffers the renderer is done with back to the control side, where they
//! are freed. Nothing here blocks.

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::warn;

use crate::sequencing::{Bpm, ScheduledNote};

/// Identifies one `play_pattern` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Strike a bell voice now; it releases itself after `hold_frames`.
    NoteOn {
        frequency: f32,
        velocity: f32,
        hold_frames: u64,
    },
    SetMasterGain(f32),
    /// Start the transport clock from zero (no-op if already running).
    StartClock,
    PauseClock,
    ResumeClock,
    /// Replace the metronome loop.
    StartMetronome { bpm: Bpm },
    StopMetronome,
    /// Cancel the current pattern and schedule this one from the current
    /// clock position.
    PlayPattern {
        id: PatternId,
        notes: Vec<ScheduledNote>,
    },
    StopPattern,
    /// Hard-stop any drone and start a new one.
    StartDrone { frequency: f32 },
    StopDrone,
}

/// Reported by the renderer. `at` is the transport frame it happened on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    PatternNote {
        pattern: PatternId,
        index: usize,
        frequency: f32,
        at: u64,
    },
    PatternFinished {
        pattern: PatternId,
    },
    Beat {
        index: u64,
        accent: bool,
        at: u64,
    },
}

/// Pattern buffers in flight back to the control side.
pub(crate) const RETIRED_CAPACITY: usize = 16;

/// Control-side ends of the rings.
pub struct ControlLink {
    commands: Producer<Command>,
    events: Consumer<PlaybackEvent>,
    retired: Consumer<Vec<ScheduledNote>>,
}

/// Audio-side ends of the rings.
pub struct AudioLink {
    pub(crate) commands: Consumer<Command>,
    pub(crate) events: Producer<PlaybackEvent>,
    pub(crate) retired: Producer<Vec<ScheduledNote>>,
}

impl AudioLink {
    /// Send a used buffer back for freeing. Empty buffers own no memory and
    /// are simply dropped; a full ring frees on this thread as a last resort.
    pub(crate) fn retire(&mut self, notes: Vec<ScheduledNote>) {
        if notes.capacity() > 0 {
            let _ = self.retired.push(notes);
        }
    }
}

/// Create a connected pair of links.
pub fn link(command_capacity: usize, event_capacity: usize) -> (ControlLink, AudioLink) {
    let (command_tx, command_rx) = RingBuffer::new(command_capacity);
    let (event_tx, event_rx) = RingBuffer::new(event_capacity);
    let (retired_tx, retired_rx) = RingBuffer::new(RETIRED_CAPACITY);

    (
        ControlLink {
            commands: command_tx,
            events: event_rx,
            retired: retired_rx,
        },
        AudioLink {
            commands: command_rx,
            events: event_tx,
            retired: retired_tx,
        },
    )
}

impl ControlLink {
    /// Queue one command. A full ring drops it.
    pub fn send(&mut self, command: Command) -> bool {
        match self.commands.push(command) {
            Ok(()) => true,
            Err(rtrb::PushError::Full(command)) => {
                warn!(?command, "command ring full, dropping command");
                false
            }
        }
    }

    /// Queue several commands, all or none.
    pub fn send_all(&mut self, commands: Vec<Command>) -> bool {
        if self.commands.slots() < commands.len() {
            warn!(
                count = commands.len(),
                free = self.commands.slots(),
                "command ring too full for group, dropping all of it"
            );
            return false;
        }

        for command in commands {
            // Cannot fail: space was checked and this is the only producer.
            let _ = self.commands.push(command);
        }
        true
    }

    /// Everything the renderer reported since the last call. Also frees the
    /// pattern buffers it has retired.
    pub fn drain(&mut self) -> Vec<PlaybackEvent> {
        while let Ok(buffer) = self.retired.pop() {
            drop(buffer);
        }

        let mut events = Vec::with_capacity(self.events.slots());
        while let Ok(event) = self.events.pop() {
            events.push(event);
        }
        events
    }
}
