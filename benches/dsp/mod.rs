//! Benchmarks for the envelope, the signal and the block renderer.

mod envelope;
mod signal;
mod synth;

pub use envelope::bench_envelope;
pub use signal::bench_signal;
pub use synth::bench_synth;
