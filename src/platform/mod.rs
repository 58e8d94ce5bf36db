//! Platform capability detection and audio context hosts.
//!
//! Every platform difference the engine cares about is reduced to one
//! `ContextConfig`. A `CapabilityProbe` decides which platform we are on;
//! an `AudioHost` turns the config into a running context.

pub mod context;
pub mod cpal_host;
pub mod offline;

pub use context::{AudioContext, AudioHost, ContextState};
pub use cpal_host::CpalHost;
pub use offline::OfflineHost;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Ios,
    Android,
    Desktop,
}

/// How the platform should trade latency for stability.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatencyHint {
    Interactive,
    Balanced,
    Playback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    pub platform: Platform,
    /// `None` uses the device default.
    pub sample_rate: Option<u32>,
    pub latency_hint: LatencyHint,
    /// Frames per device callback; `None` uses the device default.
    pub buffer_size: Option<u32>,
    /// Play a near-silent buffer while unlocking.
    pub requires_unlock_ping: bool,
}

impl ContextConfig {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            // iOS only releases audio to a context that has produced sound
            // inside the unlocking gesture.
            Platform::Ios => Self {
                platform,
                sample_rate: Some(44_100),
                latency_hint: LatencyHint::Interactive,
                buffer_size: Some(256),
                requires_unlock_ping: true,
            },
            Platform::Android => Self {
                platform,
                sample_rate: Some(48_000),
                latency_hint: LatencyHint::Balanced,
                buffer_size: Some(512),
                requires_unlock_ping: false,
            },
            Platform::Desktop => Self {
                platform,
                sample_rate: None,
                latency_hint: LatencyHint::Interactive,
                buffer_size: None,
                requires_unlock_ping: false,
            },
        }
    }
}

/// Answers "which platform is this?".
pub trait CapabilityProbe {
    fn detect(&self) -> Platform;

    fn context_config(&self) -> ContextConfig {
        ContextConfig::for_platform(self.detect())
    }
}

/// Classifies a browser-style user agent string.
#[derive(Debug, Clone)]
pub struct UserAgentProbe {
    user_agent: String,
}

impl UserAgentProbe {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

impl CapabilityProbe for UserAgentProbe {
    fn detect(&self) -> Platform {
        let ua = &self.user_agent;
        if ["iPhone", "iPad", "iPod"].iter().any(|d| ua.contains(d)) {
            Platform::Ios
        } else if ua.contains("Android") {
            Platform::Android
        } else {
            Platform::Desktop
        }
    }
}

/// Platform of the compile target.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProbe;

impl CapabilityProbe for NativeProbe {
    fn detect(&self) -> Platform {
        if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else {
            Platform::Desktop
        }
    }
}

/// Always reports the same platform.
#[derive(Debug, Clone, Copy)]
pub struct FixedPlatform(pub Platform);

impl CapabilityProbe for FixedPlatform {
    fn detect(&self) -> Platform {
        self.0
    }
}
