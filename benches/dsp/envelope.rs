//! Benchmarks for the ADSR state machine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use duo_fm::dsp::Envelope;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f64 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];

        // Attack phase (ramping up); restarted every iteration so the whole
        // block stays inside the ramp.
        let mut env = Envelope::adsr(0.5, 0.1, 0.7, 0.3);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.reset();
                env.render(0, black_box(&mut buffer), SAMPLE_RATE, true);
            })
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 0.3);
        for _ in 0..200 {
            env.coefficient(0, SAMPLE_RATE, true);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(0, black_box(&mut buffer), SAMPLE_RATE, true);
            })
        });

        // Disabled (bypass)
        let mut env = Envelope::new();
        env.set_enabled(false);
        group.bench_with_input(BenchmarkId::new("bypass", size), &size, |b, _| {
            b.iter(|| {
                env.render(0, black_box(&mut buffer), SAMPLE_RATE, true);
            })
        });
    }

    group.finish();
}
