//! Real audio output through cpal.
//!
//! The renderer produces mono; the device callback copies each sample to
//! every output channel.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{info, warn};

use crate::{
    engine::renderer::Renderer,
    error::{Error, Result},
    platform::{
        context::{lock_output, AudioContext, AudioHost, ContextState, OutputSlot, PING_FRAMES},
        ContextConfig,
    },
    MAX_BLOCK_SIZE,
};

pub struct CpalHost {
    host: cpal::Host,
}

impl CpalHost {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }
}

impl Default for CpalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioHost for CpalHost {
    fn create_context(&self, config: &ContextConfig) -> Result<Box<dyn AudioContext>> {
        let device = self
            .host
            .default_output_device()
            .ok_or_else(|| Error::ContextInit("no default output device available".into()))?;
        let default_config: cpal::StreamConfig = device
            .default_output_config()
            .map_err(|err| Error::ContextInit(format!("failed to fetch default output config: {err}")))?
            .into();

        let mut stream_config = default_config.clone();
        if let Some(rate) = config.sample_rate {
            stream_config.sample_rate = cpal::SampleRate(rate);
        }
        if let Some(frames) = config.buffer_size {
            stream_config.buffer_size = cpal::BufferSize::Fixed(frames);
        }

        let slot = OutputSlot::default();
        let stream = match build_stream(&device, &stream_config, Arc::clone(&slot)) {
            Ok(stream) => stream,
            Err(err) => {
                warn!(%err, ?config.platform, "requested stream config rejected, using device defaults");
                stream_config = default_config;
                build_stream(&device, &stream_config, Arc::clone(&slot))
                    .map_err(|err| Error::ContextInit(format!("failed to build output stream: {err}")))?
            }
        };

        // Some backends start streams immediately; contexts begin suspended.
        stream
            .pause()
            .map_err(|err| Error::ContextInit(format!("failed to pause new stream: {err}")))?;

        info!(
            sample_rate = stream_config.sample_rate.0,
            channels = stream_config.channels,
            "audio context created"
        );

        Ok(Box::new(CpalContext {
            stream: Some(stream),
            slot,
            sample_rate: stream_config.sample_rate.0,
            state: ContextState::Suspended,
        }))
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    slot: OutputSlot,
) -> std::result::Result<cpal::Stream, cpal::BuildStreamError> {
    let channels = (config.channels as usize).max(1);
    let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];

    device.build_output_stream(
        config,
        move |data: &mut [f32], _| {
            let Ok(mut output) = slot.lock() else {
                data.fill(0.0);
                return;
            };

            let total_frames = data.len() / channels;
            let mut frames_written = 0;
            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut mono[..frames];
                output.render(block);

                // Copy to output (mono to all channels)
                let start = frames_written * channels;
                let out = &mut data[start..start + frames * channels];
                for (frame, &sample) in out.chunks_mut(channels).zip(block.iter()) {
                    frame.fill(sample);
                }
                frames_written += frames;
            }
        },
        |err| warn!(%err, "audio stream error"),
        None,
    )
}

struct CpalContext {
    stream: Option<cpal::Stream>,
    slot: OutputSlot,
    sample_rate: u32,
    state: ContextState,
}

impl CpalContext {
    fn stream(&self) -> Result<&cpal::Stream> {
        self.stream
            .as_ref()
            .ok_or_else(|| Error::Device("audio context is closed".into()))
    }
}

impl AudioContext for CpalContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn resume(&mut self) -> Result<()> {
        self.stream()?
            .play()
            .map_err(|err| Error::Device(format!("failed to resume output: {err}")))?;
        self.state = ContextState::Running;
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        self.stream()?
            .pause()
            .map_err(|err| Error::Device(format!("failed to suspend output: {err}")))?;
        self.state = ContextState::Suspended;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the stream releases the device.
        self.stream = None;
        self.disconnect();
        self.state = ContextState::Closed;
        Ok(())
    }

    fn play_unlock_ping(&mut self) -> Result<()> {
        self.stream()?;
        lock_output(&self.slot)?.ping_remaining = PING_FRAMES;
        Ok(())
    }

    fn connect(&mut self, renderer: Renderer) -> Result<()> {
        if self.state == ContextState::Closed {
            return Err(Error::AudioInit("audio context is closed".into()));
        }
        lock_output(&self.slot)
            .map_err(|err| Error::AudioInit(err.to_string()))?
            .renderer = Some(renderer);
        Ok(())
    }

    fn disconnect(&mut self) -> Option<Renderer> {
        self.slot.lock().ok()?.renderer.take()
    }
}
