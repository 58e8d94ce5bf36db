//! Real-world scenario benchmarks.
//!
//! Single voices, a full chord stack, and the renderer the audio callback
//! actually runs.

mod renderer;
mod voices;

pub use renderer::bench_renderer;
pub use voices::bench_voices;
