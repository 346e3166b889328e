//! Benchmarks for full stereo block rendering, message drain included.

use std::collections::VecDeque;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use duo_fm::{
    synth::{FmSynth, SynthMessage},
    SynthConfig,
};

use crate::BLOCK_SIZES;

pub fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synth");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        let mut synth = FmSynth::new(SynthConfig::default(), VecDeque::new());
        synth.handle_message(SynthMessage::NoteOn { note: 57, velocity: 100 });
        synth.params().set("carrier_mod_enabled", 1.0).unwrap();

        group.bench_with_input(BenchmarkId::new("stereo_fm", size), &size, |b, _| {
            b.iter(|| {
                synth.render_block(black_box(&mut [&mut left[..], &mut right[..]]));
            })
        });
    }

    group.finish();
}
