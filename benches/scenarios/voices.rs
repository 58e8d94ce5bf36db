//! Benchmarks for the preset voices and full polyphony.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use handpan_dsp::graph::node::{GraphNode, RenderCtx};
use handpan_dsp::synth::{factory::boxed, PolySynth};
use handpan_dsp::voices;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;
const RING: [f32; 9] = [216.0, 230.4, 256.0, 288.0, 324.0, 345.6, 384.0, 432.0, 512.0];

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let ctx = RenderCtx::from_freq(SAMPLE_RATE, 288.0, 1.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === PRESET VOICES ===
        let mut handpan = voices::handpan();
        handpan.note_on(&ctx);
        group.bench_with_input(BenchmarkId::new("voices::handpan", size), &size, |b, _| {
            b.iter(|| {
                handpan.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        let mut drone = voices::drone(0.15);
        drone.note_on(&ctx);
        group.bench_with_input(BenchmarkId::new("voices::drone", size), &size, |b, _| {
            b.iter(|| {
                drone.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // === FULL POLYPHONY ===
        // 16 held handpan voices: the worst case the renderer allows
        let mut poly = PolySynth::new(&boxed(voices::handpan), 16, SAMPLE_RATE);
        for frequency in RING.iter().cycle().take(16) {
            poly.note_on(*frequency, 1.0, None);
        }
        group.bench_with_input(BenchmarkId::new("poly_16", size), &size, |b, _| {
            b.iter(|| {
                poly.render_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
