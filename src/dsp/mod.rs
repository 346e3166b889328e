//! Per-sample DSP primitives of the FM voice.
//!
//! Everything here is allocation-free and lock-free once constructed, so it
//! can run directly on the audio thread. Parameters are read from the shared
//! cells in [`crate::params`] on every call.

/// Tolerant comparisons for state-machine thresholds.
pub mod approx;
/// Attack/decay/sustain/release gain state machine.
pub mod envelope;
/// Phase-accumulating oscillator with an optional modulator.
pub mod signal;
/// Periodic generator functions.
pub mod waveform;

pub use envelope::{Envelope, EnvelopeState};
pub use signal::{Generator, Signal};
pub use waveform::Waveform;
