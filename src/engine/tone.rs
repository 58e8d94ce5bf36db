//! The polyphonic bell engine, control side.
//!
//! `ToneEngine` owns the control end of the command ring and the master
//! volume. The synthesizer itself lives in the `Renderer` on the audio
//! thread; everything here only validates requests and queues commands.

use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    engine::{
        message::{link, Command, ControlLink},
        renderer::Renderer,
    },
    error::{check_frequency, Error, Result, ValidationError},
    platform::{AudioContext, ContextState},
    sequencing::NoteLength,
};

pub const MIN_VOLUME_DB: f32 = -40.0;
pub const MAX_VOLUME_DB: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Disposed,
}

/// Clamp a volume request; `None` for NaN.
pub fn clamp_volume_db(db: f32) -> Option<f32> {
    (!db.is_nan()).then(|| db.clamp(MIN_VOLUME_DB, MAX_VOLUME_DB))
}

pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

pub struct ToneEngine {
    state: EngineState,
    config: EngineConfig,
    link: Option<ControlLink>,
    sample_rate: f32,
    volume_db: f32,
}

impl ToneEngine {
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        let volume_db = clamp_volume_db(config.volume_db).unwrap_or(MAX_VOLUME_DB);
        Self {
            state: EngineState::Uninitialized,
            config,
            link: None,
            sample_rate: 0.0,
            volume_db,
        }
    }

    /// Build the renderer and attach it to `context`. No-op while `Ready`.
    pub fn initialize(&mut self, context: &mut dyn AudioContext) -> Result<()> {
        if self.state == EngineState::Ready {
            return Ok(());
        }
        self.state = EngineState::Initializing;

        match self.attach(context) {
            Ok(link) => {
                self.link = Some(link);
                self.state = EngineState::Ready;
                info!(
                    sample_rate = self.sample_rate,
                    polyphony = self.config.polyphony,
                    volume_db = self.volume_db,
                    "tone engine ready"
                );
                Ok(())
            }
            Err(err) => {
                self.state = EngineState::Uninitialized;
                Err(err)
            }
        }
    }

    fn attach(&mut self, context: &mut dyn AudioContext) -> Result<ControlLink> {
        if context.state() == ContextState::Closed {
            return Err(Error::AudioInit("audio context is closed".into()));
        }

        self.sample_rate = context.sample_rate() as f32;
        let (control, audio) = link(self.config.command_capacity, self.config.event_capacity);
        let renderer = Renderer::new(
            self.sample_rate,
            &self.config,
            db_to_gain(self.volume_db),
            audio,
        );

        // On failure the context drops the renderer, and the control end
        // goes with this frame.
        context.connect(renderer)?;
        Ok(control)
    }

    /// Strike one note. Silent no-op unless `Ready`.
    pub fn play_note(&mut self, frequency_hz: f32, length: NoteLength) -> Result<()> {
        let frequency = check_frequency(frequency_hz)?;
        let hold_frames = length.hold_frames(self.sample_rate);

        let Some(link) = self.ready_link() else {
            debug!(frequency, "play_note before ready, ignoring");
            return Ok(());
        };
        link.send(Command::NoteOn {
            frequency,
            velocity: 1.0,
            hold_frames,
        });
        Ok(())
    }

    /// Strike every frequency on the same sample with one shared hold.
    pub fn play_chord(&mut self, frequencies: &[f32], length: NoteLength) -> Result<()> {
        let frequencies = frequencies
            .iter()
            .map(|&f| check_frequency(f))
            .collect::<std::result::Result<Vec<_>, ValidationError>>()?;
        if frequencies.is_empty() {
            return Ok(());
        }
        let hold_frames = length.hold_frames(self.sample_rate);

        let Some(link) = self.ready_link() else {
            debug!(notes = frequencies.len(), "play_chord before ready, ignoring");
            return Ok(());
        };
        let commands = frequencies
            .into_iter()
            .map(|frequency| Command::NoteOn {
                frequency,
                velocity: 1.0,
                hold_frames,
            })
            .collect();
        link.send_all(commands);
        Ok(())
    }

    /// Set master volume in dB relative to full scale. Clamped to
    /// [-40, 0]; NaN is ignored. Remembered while not initialized.
    pub fn set_volume(&mut self, relative_db: f32) {
        let Some(db) = clamp_volume_db(relative_db) else {
            debug!("ignoring NaN volume");
            return;
        };
        self.volume_db = db;

        if let Some(link) = self.ready_link() {
            link.send(Command::SetMasterGain(db_to_gain(db)));
        }
    }

    pub fn volume_db(&self) -> f32 {
        self.volume_db
    }

    pub fn gain(&self) -> f32 {
        db_to_gain(self.volume_db)
    }

    /// Detach and drop the renderer: every voice, loop and drone stops.
    pub fn dispose(&mut self, context: Option<&mut (dyn AudioContext + 'static)>) {
        if self.link.take().is_some() {
            if let Some(context) = context {
                drop(context.disconnect());
            }
        }
        if self.state != EngineState::Uninitialized {
            info!("tone engine disposed");
        }
        self.state = EngineState::Disposed;
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The command link, only while `Ready`.
    pub fn link_mut(&mut self) -> Option<&mut ControlLink> {
        self.ready_link()
    }

    fn ready_link(&mut self) -> Option<&mut ControlLink> {
        match self.state {
            EngineState::Ready => self.link.as_mut(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{AudioHost, CapabilityProbe, FixedPlatform, OfflineHost, Platform};

    fn context(host: &OfflineHost) -> Box<dyn AudioContext> {
        host.create_context(&FixedPlatform(Platform::Desktop).context_config())
            .unwrap()
    }

    #[test]
    fn initialize_is_idempotent() {
        let host = OfflineHost::default();
        let mut context = context(&host);
        let mut engine = ToneEngine::new(EngineConfig::default());

        engine.initialize(context.as_mut()).unwrap();
        engine.initialize(context.as_mut()).unwrap();
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(host.renderers_connected(), 1);
    }

    #[test]
    fn failed_initialize_can_be_retried() {
        let host = OfflineHost::default();
        let mut context = context(&host);
        let mut engine = ToneEngine::new(EngineConfig::default());

        host.set_refuse_connections(true);
        let err = engine.initialize(context.as_mut()).unwrap_err();
        assert!(matches!(err, Error::AudioInit(_)));
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(!host.has_renderer());

        host.set_refuse_connections(false);
        engine.initialize(context.as_mut()).unwrap();
        assert!(engine.is_ready());
    }

    #[test]
    fn play_before_ready_is_a_silent_no_op() {
        let mut engine = ToneEngine::new(EngineConfig::default());
        assert!(engine.play_note(432.0, NoteLength::Short).is_ok());
        assert!(engine.play_chord(&[288.0, 345.6], NoteLength::Long).is_ok());
    }

    #[test]
    fn invalid_frequencies_are_rejected_even_before_ready() {
        let mut engine = ToneEngine::new(EngineConfig::default());
        assert!(matches!(
            engine.play_note(-1.0, NoteLength::Short),
            Err(Error::Validation(ValidationError::InvalidFrequency(_)))
        ));
        assert!(engine
            .play_chord(&[288.0, f32::NAN], NoteLength::Short)
            .is_err());
    }

    #[test]
    fn volume_is_clamped_and_remembered() {
        let mut engine = ToneEngine::new(EngineConfig::default());
        assert_eq!(engine.volume_db(), -6.0);

        engine.set_volume(50.0);
        assert_eq!(engine.volume_db(), 0.0);
        assert_eq!(engine.gain(), 1.0);

        engine.set_volume(-100.0);
        assert_eq!(engine.volume_db(), -40.0);
        assert!((engine.gain() - 0.01).abs() < 1e-6);

        engine.set_volume(f32::NAN);
        assert_eq!(engine.volume_db(), -40.0);
    }

    #[test]
    fn dispose_detaches_the_renderer() {
        let host = OfflineHost::default();
        let mut context = context(&host);
        let mut engine = ToneEngine::new(EngineConfig::default());
        engine.initialize(context.as_mut()).unwrap();

        engine.dispose(Some(context.as_mut()));
        assert_eq!(engine.state(), EngineState::Disposed);
        assert!(!host.has_renderer());
        assert!(engine.link_mut().is_none());
        assert!(engine.play_note(432.0, NoteLength::Short).is_ok());
    }
}
