//! Benchmarks for low-level DSP primitives.

mod envelope;
mod fm;
mod oscillator;

pub use envelope::bench_envelope;
pub use fm::bench_fm;
pub use oscillator::bench_oscillator;
