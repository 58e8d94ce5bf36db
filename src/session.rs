/*
Audio Session
=============

Mobile browsers and OSes only let audio start from inside a user gesture.
The session owns the audio context and walks it through that handshake:

    no context ──initialize_context──> Suspended
                                          │ unlock() (in a gesture)
                                          v
                       resume + optional ping, unlocked = true
                                          │
                           pending callbacks flushed, FIFO
                                          v
                                       Running

`unlocked` flips false → true once per session lifetime. Callbacks queued
with `on_unlock` before that fire exactly once, in registration order; after
it they run immediately. `dispose` closes the context and forgets everything,
including callbacks that never got to fire.
*/

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::{
    error::Result,
    platform::{AudioContext, AudioHost, CapabilityProbe, ContextConfig, ContextState},
};

type UnlockCallback = Box<dyn FnOnce()>;

#[derive(Default)]
struct UnlockState {
    unlocked: bool,
    pending: VecDeque<UnlockCallback>,
}

/// What a call to `unlock` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// This call performed the unlock.
    Unlocked,
    /// The session was already unlocked; the context was resumed if needed.
    AlreadyUnlocked,
}

pub struct AudioSession {
    host: Box<dyn AudioHost>,
    probe: Box<dyn CapabilityProbe>,
    context: Option<Box<dyn AudioContext>>,
    config: Option<ContextConfig>,
    unlock: UnlockState,
    hidden: bool,
    /// Whether the context was running when the app was hidden.
    resume_on_show: bool,
}

impl AudioSession {
    pub fn new(host: Box<dyn AudioHost>, probe: Box<dyn CapabilityProbe>) -> Self {
        Self {
            host,
            probe,
            context: None,
            config: None,
            unlock: UnlockState::default(),
            hidden: false,
            resume_on_show: false,
        }
    }

    /// Create the (suspended) context if there is none yet.
    pub fn initialize_context(&mut self) -> Result<&mut dyn AudioContext> {
        let context = match self.context.take() {
            Some(context) if context.state() != ContextState::Closed => context,
            _ => {
                let config = self.probe.context_config();
                let context = self.host.create_context(&config)?;
                info!(
                    platform = ?config.platform,
                    sample_rate = context.sample_rate(),
                    "audio context initialized"
                );
                self.config = Some(config);
                context
            }
        };
        Ok(self.context.insert(context).as_mut())
    }

    /// Run inside a user gesture.
    pub fn unlock(&mut self) -> Result<UnlockOutcome> {
        let requires_ping = {
            let context = self.initialize_context()?;
            if context.state() != ContextState::Running {
                context.resume()?;
            }
            self.config
                .as_ref()
                .is_some_and(|config| config.requires_unlock_ping)
        };

        if self.unlock.unlocked {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }

        if requires_ping {
            if let Some(context) = self.context.as_mut() {
                context.play_unlock_ping()?;
            }
        }

        self.unlock.unlocked = true;
        info!(
            queued = self.unlock.pending.len(),
            "audio unlocked, flushing callbacks"
        );
        while let Some(callback) = self.unlock.pending.pop_front() {
            callback();
        }
        Ok(UnlockOutcome::Unlocked)
    }

    /// Run `callback` once the session is unlocked (now, if it already is).
    pub fn on_unlock(&mut self, callback: impl FnOnce() + 'static) {
        if self.unlock.unlocked {
            callback();
        } else {
            debug!("audio locked, queueing unlock callback");
            self.unlock.pending.push_back(Box::new(callback));
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlock.unlocked
    }

    /// Unlocked and the context is running.
    pub fn is_ready(&self) -> bool {
        self.unlock.unlocked && self.context_state() == Some(ContextState::Running)
    }

    pub fn context_state(&self) -> Option<ContextState> {
        self.context.as_ref().map(|c| c.state())
    }

    pub fn context_mut(&mut self) -> Option<&mut (dyn AudioContext + 'static)> {
        self.context.as_deref_mut()
    }

    pub fn config(&self) -> Option<&ContextConfig> {
        self.config.as_ref()
    }

    /// App hidden: suspend a running context and remember it was running.
    ///
    /// Repeated hide signals without a show in between are ignored.
    pub fn suspend_for_background(&mut self) -> Result<()> {
        if self.hidden {
            return Ok(());
        }
        self.hidden = true;
        self.resume_on_show = false;
        if let Some(context) = self.context.as_mut() {
            if context.state() == ContextState::Running {
                context.suspend()?;
                self.resume_on_show = true;
                debug!("audio context suspended for background");
            }
        }
        Ok(())
    }

    /// App visible again: resume the context if hiding suspended it.
    ///
    /// Returns whether the context was resumed.
    pub fn resume_from_background(&mut self) -> Result<bool> {
        self.hidden = false;
        if !std::mem::take(&mut self.resume_on_show) {
            return Ok(false);
        }
        match self.context.as_mut() {
            Some(context) if context.state() == ContextState::Suspended => {
                context.resume()?;
                debug!("audio context resumed from background");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Close the context and reset the unlock state. Queued callbacks are
    /// dropped without running.
    pub fn dispose(&mut self) -> Result<()> {
        let dropped = self.unlock.pending.len();
        self.unlock = UnlockState::default();
        self.hidden = false;
        self.resume_on_show = false;
        self.config = None;

        if let Some(mut context) = self.context.take() {
            context.close()?;
        }
        info!(dropped_callbacks = dropped, "audio session disposed");
        Ok(())
    }
}
