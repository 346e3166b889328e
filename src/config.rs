//! Construction-time settings for [`FmSynth`](crate::synth::FmSynth).
//!
//! Live values (amplitudes, ADSR times, enable flags) are not configured here;
//! they live in the parameter cells and can change at any time.

use crate::dsp::waveform::Waveform;

/// Capacity of the control → audio message queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub sample_rate: f64,
    pub carrier_waveform: Waveform,
    /// `None` leaves the carrier without a modulator at all.
    pub modulator_waveform: Option<Waveform>,
    /// Frequency of MIDI note 69 (A4) in Hz.
    pub tuning: f64,
    pub queue_capacity: usize,
}

impl SynthConfig {
    pub fn new() -> Self {
        Self {
            sample_rate: 48_000.0,
            carrier_waveform: Waveform::Sine,
            modulator_waveform: Some(Waveform::Sine),
            tuning: 440.0,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn carrier(mut self, waveform: Waveform) -> Self {
        self.carrier_waveform = waveform;
        self
    }

    pub fn modulator(mut self, waveform: Option<Waveform>) -> Self {
        self.modulator_waveform = waveform;
        self
    }

    pub fn tuning(mut self, a4: f64) -> Self {
        self.tuning = a4;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Convert a MIDI note number to Hz under this tuning.
    #[inline]
    pub fn note_to_frequency(&self, note: u8) -> f64 {
        self.tuning * 2.0_f64.powf((note as f64 - 69.0) / 12.0)
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self::new()
    }
}
