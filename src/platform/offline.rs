//! Headless audio host.
//!
//! Nothing is played; the caller pulls samples with `render`, exactly as a
//! device callback would. Tests use it to observe what the engine produced,
//! and it can stand in for a platform that refuses audio.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    engine::renderer::Renderer,
    error::{Error, Result},
    platform::{
        context::{AudioContext, AudioHost, ContextState, SharedOutput, PING_FRAMES},
        ContextConfig,
    },
};

pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

struct Playback {
    id: usize,
    state: ContextState,
    output: SharedOutput,
}

struct OfflineDevice {
    sample_rate: u32,
    refuse_contexts: bool,
    refuse_connections: bool,
    contexts_created: usize,
    renderers_connected: usize,
    pings: usize,
    current: Option<Playback>,
}

/// A host with one virtual output device. Clones share the device.
#[derive(Clone)]
pub struct OfflineHost {
    device: Arc<Mutex<OfflineDevice>>,
}

fn lock(device: &Mutex<OfflineDevice>) -> MutexGuard<'_, OfflineDevice> {
    device.lock().unwrap_or_else(PoisonError::into_inner)
}

impl OfflineHost {
    /// `sample_rate` is used when the context config leaves it open.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            device: Arc::new(Mutex::new(OfflineDevice {
                sample_rate,
                refuse_contexts: false,
                refuse_connections: false,
                contexts_created: 0,
                renderers_connected: 0,
                pings: 0,
                current: None,
            })),
        }
    }

    /// A host whose platform denies every context.
    pub fn refusing() -> Self {
        let host = Self::default();
        host.set_refuse_contexts(true);
        host
    }

    pub fn set_refuse_contexts(&self, refuse: bool) {
        lock(&self.device).refuse_contexts = refuse;
    }

    /// Make `connect` fail, as if the synthesis graph could not be built.
    pub fn set_refuse_connections(&self, refuse: bool) {
        lock(&self.device).refuse_connections = refuse;
    }

    /// Pull `frames` mono samples from the current context.
    ///
    /// A context that is not running produces silence and its renderer
    /// does not advance.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        let mut device = lock(&self.device);
        if let Some(playback) = device.current.as_mut() {
            if playback.state == ContextState::Running {
                playback.output.render(&mut out);
            }
        }
        out
    }

    /// Render `seconds` of audio at the current context's rate.
    pub fn render_seconds(&self, seconds: f32) -> Vec<f32> {
        let frames = (seconds * self.sample_rate() as f32).round() as usize;
        self.render(frames)
    }

    /// Rate of the current context, or the host default.
    pub fn sample_rate(&self) -> u32 {
        let device = lock(&self.device);
        device.sample_rate
    }

    pub fn contexts_created(&self) -> usize {
        lock(&self.device).contexts_created
    }

    pub fn renderers_connected(&self) -> usize {
        lock(&self.device).renderers_connected
    }

    pub fn pings(&self) -> usize {
        lock(&self.device).pings
    }

    /// State of the current context, `None` if there is none.
    pub fn state(&self) -> Option<ContextState> {
        lock(&self.device).current.as_ref().map(|p| p.state)
    }

    pub fn has_renderer(&self) -> bool {
        lock(&self.device)
            .current
            .as_ref()
            .is_some_and(|p| p.output.renderer.is_some())
    }
}

impl Default for OfflineHost {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl AudioHost for OfflineHost {
    fn create_context(&self, config: &ContextConfig) -> Result<Box<dyn AudioContext>> {
        let mut device = lock(&self.device);
        if device.refuse_contexts {
            return Err(Error::ContextInit(
                "platform refused to create an audio context".into(),
            ));
        }

        device.contexts_created += 1;
        if let Some(rate) = config.sample_rate {
            device.sample_rate = rate;
        }
        let id = device.contexts_created;
        device.current = Some(Playback {
            id,
            state: ContextState::Suspended,
            output: SharedOutput::default(),
        });

        Ok(Box::new(OfflineContext {
            device: Arc::clone(&self.device),
            id,
            sample_rate: device.sample_rate,
            closed: false,
        }))
    }
}

struct OfflineContext {
    device: Arc<Mutex<OfflineDevice>>,
    id: usize,
    sample_rate: u32,
    closed: bool,
}

impl OfflineContext {
    /// Run `f` on this context's playback, if it still owns the device.
    fn with_playback<T>(&self, f: impl FnOnce(&mut Playback) -> T) -> Result<T> {
        if self.closed {
            return Err(Error::Device("audio context is closed".into()));
        }
        let mut device = lock(&self.device);
        match device.current.as_mut() {
            Some(playback) if playback.id == self.id => Ok(f(playback)),
            _ => Err(Error::Device(
                "audio context was replaced by a newer one".into(),
            )),
        }
    }
}

impl AudioContext for OfflineContext {
    fn state(&self) -> ContextState {
        self.with_playback(|p| p.state)
            .unwrap_or(ContextState::Closed)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn resume(&mut self) -> Result<()> {
        self.with_playback(|p| p.state = ContextState::Running)
    }

    fn suspend(&mut self) -> Result<()> {
        self.with_playback(|p| p.state = ContextState::Suspended)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let mut device = lock(&self.device);
        if device.current.as_ref().is_some_and(|p| p.id == self.id) {
            device.current = None;
        }
        self.closed = true;
        Ok(())
    }

    fn play_unlock_ping(&mut self) -> Result<()> {
        self.with_playback(|p| p.output.ping_remaining = PING_FRAMES)?;
        lock(&self.device).pings += 1;
        Ok(())
    }

    fn connect(&mut self, renderer: Renderer) -> Result<()> {
        if lock(&self.device).refuse_connections {
            return Err(Error::AudioInit("synthesis graph was refused".into()));
        }
        self.with_playback(|p| p.output.renderer = Some(renderer))
            .map_err(|err| Error::AudioInit(err.to_string()))?;
        lock(&self.device).renderers_connected += 1;
        Ok(())
    }

    fn disconnect(&mut self) -> Option<Renderer> {
        self.with_playback(|p| p.output.renderer.take())
            .ok()
            .flatten()
    }
}
