//! Composable building blocks for constructing voices.
//!
//! Graph nodes wrap the low-level DSP primitives with what an instrument
//! needs on top: note events, hard resets and block-based rendering. The
//! `extensions` module adds fluent helpers so voices read as one chain.

/// Multiply two signals together (amplitude control).
pub mod amplify;
/// Envelope generator node exposing ADSR state.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.gain()`).
pub mod extensions;
/// FM source with an enveloped modulation index.
pub mod fm;
/// Fixed output level.
pub mod gain;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators.
pub mod oscillator;

pub use node::{GraphNode, RenderCtx};
