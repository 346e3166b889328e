//! Periodic generator functions over radian phase.
//!
//! A [`Signal`](crate::dsp::signal::Signal) never wraps its phase, so every
//! generator here takes an unbounded phase in radians and must be periodic
//! over 2π. None of them are band-limited.

use std::f64::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Saw,
    Square,
}

impl Waveform {
    /// The generator function for this shape.
    pub fn generator(self) -> fn(f64) -> f64 {
        match self {
            Waveform::Sine => sine,
            Waveform::Triangle => triangle,
            Waveform::Saw => saw,
            Waveform::Square => square,
        }
    }
}

#[inline]
pub fn sine(phase: f64) -> f64 {
    phase.sin()
}

/// Rising ramp from -1 at phase 0 to just under +1 at 2π.
#[inline]
pub fn saw(phase: f64) -> f64 {
    phase.rem_euclid(TAU) / PI - 1.0
}

/// +1 for the first half-cycle, -1 for the second.
#[inline]
pub fn square(phase: f64) -> f64 {
    if phase.rem_euclid(TAU) < PI {
        1.0
    } else {
        -1.0
    }
}

/// Starts at 0 rising, like `sine`: peaks at π/2, troughs at 3π/2.
#[inline]
pub fn triangle(phase: f64) -> f64 {
    let t = (phase + PI / 2.0).rem_euclid(TAU) / TAU;
    1.0 - 4.0 * (t - 0.5).abs()
}
