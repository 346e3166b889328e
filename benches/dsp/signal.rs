//! Benchmarks for the phase-accumulating signal, with and without FM.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use duo_fm::dsp::{waveform, Signal};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f64 = 48_000.0;

fn render(signal: &mut Signal, buffer: &mut [f64]) {
    for sample in buffer.iter_mut() {
        *sample = signal.sample(0, true);
    }
}

pub fn bench_signal(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/signal");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];

        // Carrier only - one sin() per sample
        let mut carrier = Signal::new(waveform::sine, SAMPLE_RATE);
        carrier.update_frequency(440.0);
        group.bench_with_input(BenchmarkId::new("carrier", size), &size, |b, _| {
            b.iter(|| render(&mut carrier, black_box(&mut buffer)))
        });

        // Carrier + modulator - two sin() and two envelopes per sample
        let mut fm = Signal::new(waveform::sine, SAMPLE_RATE);
        fm.enable_modulation(waveform::sine);
        if let Some(modulation) = fm.modulation_mut() {
            modulation.set_enabled(true);
            modulation.envelope_mut().set_enabled(true);
        }
        fm.set_modulation_ratio(2.0);
        fm.update_frequency(440.0);
        group.bench_with_input(BenchmarkId::new("fm", size), &size, |b, _| {
            b.iter(|| render(&mut fm, black_box(&mut buffer)))
        });
    }

    group.finish();
}
