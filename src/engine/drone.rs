//! Sustained drone, control side.

use tracing::debug;

use crate::{
    engine::message::{Command, ControlLink},
    error::{check_frequency, ValidationError},
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DroneState {
    pub active: bool,
    pub frequency_hz: Option<f32>,
}

/// At most one drone: starting a new one hard-stops the old one.
#[derive(Debug, Default)]
pub struct DroneController {
    state: DroneState,
}

impl DroneController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, link: &mut ControlLink, frequency_hz: f32) -> Result<(), ValidationError> {
        let frequency = check_frequency(frequency_hz)?;
        if link.send(Command::StartDrone { frequency }) {
            debug!(frequency, replaced = ?self.state.frequency_hz, "drone started");
            self.state = DroneState {
                active: true,
                frequency_hz: Some(frequency),
            };
        }
        Ok(())
    }

    /// Fade the drone out. Idempotent.
    pub fn stop(&mut self, link: &mut ControlLink) {
        if !self.state.active {
            return;
        }
        if link.send(Command::StopDrone) {
            debug!("drone stopped");
            self.state = DroneState::default();
        }
    }

    pub fn state(&self) -> DroneState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = DroneState::default();
    }
}
