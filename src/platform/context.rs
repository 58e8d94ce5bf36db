use std::sync::{Arc, Mutex};

use crate::{
    engine::renderer::Renderer,
    error::{Error, Result},
    platform::ContextConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
    Closed,
}

/// One audio output the engine can render into.
///
/// Contexts are created `Suspended`; only `resume` inside a user gesture
/// makes them audible. They are driven from the control thread and are not
/// required to be `Send`.
pub trait AudioContext {
    fn state(&self) -> ContextState;

    fn sample_rate(&self) -> u32;

    fn resume(&mut self) -> Result<()>;

    fn suspend(&mut self) -> Result<()>;

    /// Release the device. Closed contexts cannot be resumed.
    fn close(&mut self) -> Result<()>;

    /// Queue a very short, near-silent buffer.
    fn play_unlock_ping(&mut self) -> Result<()>;

    /// Attach the renderer the output pulls samples from.
    ///
    /// On failure the renderer is dropped with the error.
    fn connect(&mut self, renderer: Renderer) -> Result<()>;

    fn disconnect(&mut self) -> Option<Renderer>;
}

/// Creates audio contexts.
pub trait AudioHost {
    fn create_context(&self, config: &ContextConfig) -> Result<Box<dyn AudioContext>>;
}

/// Level of the unlock ping: far below audibility, but not digital silence.
pub(crate) const PING_LEVEL: f32 = 1.0e-4;
/// Ping length in frames.
pub(crate) const PING_FRAMES: usize = 64;

/// What the device callback renders from.
#[derive(Default)]
pub(crate) struct SharedOutput {
    pub(crate) renderer: Option<Renderer>,
    pub(crate) ping_remaining: usize,
}

pub(crate) type OutputSlot = Arc<Mutex<SharedOutput>>;

impl SharedOutput {
    pub(crate) fn render(&mut self, out: &mut [f32]) {
        match &mut self.renderer {
            Some(renderer) => renderer.render(out),
            None => out.fill(0.0),
        }

        let ping = self.ping_remaining.min(out.len());
        for sample in &mut out[..ping] {
            *sample += PING_LEVEL;
        }
        self.ping_remaining -= ping;
    }
}

pub(crate) fn lock_output(slot: &OutputSlot) -> Result<std::sync::MutexGuard<'_, SharedOutput>> {
    slot.lock()
        .map_err(|_| Error::Device("audio output state poisoned".into()))
}
