//! The shared transport clock.
//!
//! Counts rendered frames while running. Metronome beats and pattern notes
//! are both placed on this one timeline, so the two lanes cannot drift
//! apart.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Default)]
pub struct TransportClock {
    state: ClockState,
    position: u64,
}

impl TransportClock {
    /// Start from zero. No-op if already running; resumes if paused.
    pub fn start(&mut self) {
        match self.state {
            ClockState::Stopped => {
                self.position = 0;
                self.state = ClockState::Running;
            }
            ClockState::Paused => self.state = ClockState::Running,
            ClockState::Running => {}
        }
    }

    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Running;
        }
    }

    /// Halt and rewind.
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.position = 0;
    }

    pub fn advance(&mut self, frames: usize) {
        if self.state == ClockState::Running {
            self.position += frames as u64;
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn position(&self) -> u64 {
        self.position
    }
}
