//! Benchmarks for the two-operator FM core.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use handpan_dsp::dsp::fm::FmOperator;

use crate::BLOCK_SIZES;

pub fn bench_fm(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/fm");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Two sin() calls per sample; the index only changes the argument.
        for (name, index) in [("plain", 0.0f32), ("bright", 1.0)] {
            let mut op = FmOperator::new(2.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = op.next_sample(black_box(288.0), 48_000.0, black_box(index));
                    }
                })
            });
        }
    }

    group.finish();
}
