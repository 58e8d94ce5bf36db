//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math; graph nodes layer note events on top.

/// Attack/decay/sustain/release envelope tuned for struck instruments.
pub mod envelope;
/// Two-operator frequency modulation (carrier + modulator).
pub mod fm;
/// Phase-accumulator oscillators.
pub mod oscillator;

pub use envelope::EnvelopeStage;
