//! The instrument's voice presets.
//!
//! Each voice is a ready-to-use node graph built from the `graph` layer.
//!
//! # Example
//!
//! ```ignore
//! use handpan_dsp::{synth::PolySynth, voices};
//!
//! let bells = PolySynth::new(&voices::handpan, 16, 48_000.0);
//! ```

pub mod click;
pub mod drone;
pub mod handpan;

pub use click::click;
pub use drone::drone;
pub use handpan::handpan;
