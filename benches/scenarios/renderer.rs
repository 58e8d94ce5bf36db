//! Benchmarks for the complete audio-thread renderer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use handpan_dsp::engine::{
    message::{link, Command},
    renderer::Renderer,
};
use handpan_dsp::sequencing::Bpm;
use handpan_dsp::EngineConfig;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_renderer(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/renderer");
    let config = EngineConfig::default();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Idle: clock running, nothing sounding
        let (mut control, audio) = link(config.command_capacity, config.event_capacity);
        let mut idle = Renderer::new(SAMPLE_RATE, &config, 0.5, audio);
        control.send(Command::StartClock);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                idle.render(black_box(&mut buffer));
                control.drain();
            })
        });

        // Busy: chord, drone and metronome together
        let (mut control, audio) = link(config.command_capacity, config.event_capacity);
        let mut busy = Renderer::new(SAMPLE_RATE, &config, 0.5, audio);
        control.send(Command::StartClock);
        control.send(Command::StartDrone { frequency: 144.0 });
        control.send(Command::StartMetronome { bpm: Bpm::new(200) });
        for frequency in [288.0, 345.6, 432.0, 512.0] {
            control.send(Command::NoteOn {
                frequency,
                velocity: 1.0,
                hold_frames: u64::MAX / 2,
            });
        }
        group.bench_with_input(BenchmarkId::new("chord_drone_metronome", size), &size, |b, _| {
            b.iter(|| {
                busy.render(black_box(&mut buffer));
                control.drain();
            })
        });
    }

    group.finish();
}
