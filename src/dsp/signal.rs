use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

use crate::{dsp::envelope::Envelope, params::SignalParams, NUM_CHANNELS};

/*
Phase-Accumulating Signal
=========================

A `Signal` is one operator of a two-operator FM voice: a phase accumulator
feeding a periodic generator function, scaled by an amplitude and an envelope.

Vocabulary
----------

  phase        Running sum in radians, one per channel. Never wrapped; the
               generator is expected to be periodic over 2π.

  increment    How far the phase moves per sample:

                   increment = 2π × frequency / sample_rate

  generator    The waveform shape, `phase -> sample` (e.g. `f64::sin`).

  carrier      The top-level signal you hear.

  modulator    A child signal whose output bends the carrier's phase. Its
               frequency is locked to the carrier's by a ratio.

  ratio        modulator_frequency = ratio × carrier_frequency

  depth        The modulator's amplitude. It scales the modulator's own output
               and is applied once more when combined, so the peak phase
               swing added to the carrier is amplitude² radians.


Composition
-----------

For every sample on a channel:

    mod    = modulator.sample(channel, gate = on) × modulator.amplitude
    s      = generate(phase + mod)
    phase += increment
    out    = s × amplitude × envelope

The modulator always renders as if the note were held, so it free-runs from
the moment it is enabled. With a sine carrier and a sine modulator this is
classic two-operator FM: sidebands at carrier ± k × modulator frequency, with
depth controlling how far the energy spreads.

Nesting stops at one level. A modulator's parameters have no modulation slot,
so `enable_modulation` on a modulator does nothing.


Envelope Coefficient
--------------------

With the envelope enabled, its coefficient shapes the output. With it
disabled the gate is used directly: 1.0 while the note is on, 0.0 otherwise.
(The envelope itself reports 1.0 when disabled; the signal does not ask it.)
*/

/// Waveform shape: radian phase in, sample out.
pub type Generator = Box<dyn Fn(f64) -> f64 + Send>;

pub struct Signal {
    params: Arc<SignalParams>,
    envelope: Envelope,
    modulation: Option<Box<Signal>>,
    generate: Option<Generator>,

    phase: [f64; NUM_CHANNELS],
    frequency: f64,
    sample_rate: f64,

    /// Ratio last propagated to the modulator; `None` forces a resync.
    synced_ratio: Option<f64>,
    /// Disable count of `params.enabled` last acted on.
    seen_disables: u32,
}

impl Signal {
    /// Carrier-role signal with default parameters.
    pub fn new(generate: impl Fn(f64) -> f64 + Send + 'static, sample_rate: f64) -> Self {
        Self::with_params(generate, sample_rate, Arc::new(SignalParams::carrier()))
    }

    /// Signal reading its parameters from shared cells.
    pub fn with_params(
        generate: impl Fn(f64) -> f64 + Send + 'static,
        sample_rate: f64,
        params: Arc<SignalParams>,
    ) -> Self {
        Self {
            envelope: Envelope::with_params(params.envelope.clone()),
            seen_disables: params.enabled.disable_count(),
            params,
            modulation: None,
            generate: Some(Box::new(generate)),
            phase: [0.0; NUM_CHANNELS],
            frequency: 440.0,
            sample_rate,
            synced_ratio: None,
        }
    }

    /// Signal with no generator; renders silence until one is set.
    pub fn silent(sample_rate: f64, params: Arc<SignalParams>) -> Self {
        let mut signal = Self::with_params(|_| 0.0, sample_rate, params);
        signal.generate = None;
        signal
    }

    pub fn set_generator(&mut self, generate: impl Fn(f64) -> f64 + Send + 'static) {
        self.generate = Some(Box::new(generate));
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        if let Some(modulation) = self.modulation.as_deref_mut() {
            modulation.set_sample_rate(sample_rate);
        }
    }

    /// Create the modulator the first time; later calls only swap its
    /// generator and keep its phase and envelope state.
    ///
    /// Does nothing on a signal whose parameters have no modulation slot,
    /// i.e. on a modulator.
    pub fn enable_modulation(&mut self, generate: impl Fn(f64) -> f64 + Send + 'static) {
        if let Some(modulation) = self.modulation.as_deref_mut() {
            modulation.set_generator(generate);
            return;
        }

        let Some(params) = self.params.modulation.clone() else {
            log::warn!("modulation requested on a signal without a modulation slot, ignoring");
            return;
        };

        let mut modulation = Signal::with_params(generate, self.sample_rate, params);
        modulation.frequency = self.modulation_ratio() * self.frequency;
        self.modulation = Some(Box::new(modulation));
        self.synced_ratio = None;
        log::debug!("modulator created at {} Hz", self.modulation_ratio() * self.frequency);
    }

    /// Set the frequency and, if an enabled modulator exists, lock its
    /// frequency to `modulation_ratio × frequency`.
    pub fn update_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;

        let ratio = self.modulation_ratio();
        if let Some(modulation) = self.modulation.as_deref_mut() {
            if modulation.is_enabled() {
                modulation.update_frequency(ratio * frequency);
                self.synced_ratio = Some(ratio);
            } else {
                self.synced_ratio = None;
            }
        }
    }

    pub fn update_amplitude(&mut self, amplitude: f64) {
        self.params.amplitude.set(amplitude);
    }

    pub fn set_modulation_ratio(&mut self, ratio: f64) {
        self.params.modulation_ratio.set(ratio);
        self.update_frequency(self.frequency);
    }

    /// Disabling zeroes both phases. Envelope and modulator are untouched.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.params.enabled.set(enabled);
        if !enabled {
            self.phase = [0.0; NUM_CHANNELS];
        }
    }

    /// Render one sample at `sample_rate`, the per-sample host entry point.
    #[inline]
    pub fn render(&mut self, channel: usize, sample_rate: f64, is_note_on: bool) -> f64 {
        if sample_rate != self.sample_rate {
            self.set_sample_rate(sample_rate);
        }
        self.sample(channel, is_note_on)
    }

    /// Render one sample at the cached sample rate and advance the phase.
    pub fn sample(&mut self, channel: usize, is_note_on: bool) -> f64 {
        self.apply_pending_disable();
        if !self.is_enabled() {
            self.phase = [0.0; NUM_CHANNELS];
            return 0.0;
        }
        if channel >= NUM_CHANNELS || self.generate.is_none() {
            return 0.0;
        }

        // A disabled modulator is never sampled, so its resets land here.
        if let Some(modulation) = self.modulation.as_deref_mut() {
            modulation.apply_pending_disable();
        }
        self.sync_modulation();

        let mut modulation_sample = 0.0;
        if let Some(modulation) = self.modulation.as_deref_mut() {
            if modulation.is_enabled() {
                modulation_sample = modulation.sample(channel, true) * modulation.amplitude();
            }
        }

        let phase = self.phase[channel] + modulation_sample;
        let sample = self.generate.as_ref().map_or(0.0, |generate| generate(phase));
        self.phase[channel] += self.phase_increment();

        let envelope_coefficient = if self.envelope.is_enabled() {
            self.envelope.coefficient(channel, self.sample_rate, is_note_on)
        } else {
            // Keeps a cell-side disable from leaving stale stages behind.
            self.envelope.reset();
            if is_note_on {
                1.0
            } else {
                0.0
            }
        };

        sample * self.amplitude() * envelope_coefficient
    }

    /// Zero both phases if the enabled cell was switched off since the last
    /// call, even if it has been switched back on in between.
    fn apply_pending_disable(&mut self) {
        let disables = self.params.enabled.disable_count();
        if disables != self.seen_disables {
            self.seen_disables = disables;
            self.phase = [0.0; NUM_CHANNELS];
        }
    }

    /// Re-lock the modulator frequency after a ratio change or re-enable
    /// that came through the shared cells instead of the setters.
    fn sync_modulation(&mut self) {
        let Some(modulation) = self.modulation.as_deref() else {
            return;
        };
        if !modulation.is_enabled() {
            self.synced_ratio = None;
            return;
        }

        let ratio = self.modulation_ratio();
        if self.synced_ratio != Some(ratio) {
            self.update_frequency(self.frequency);
        }
    }

    /// Phase advance per sample at the current frequency and sample rate.
    #[inline]
    pub fn phase_increment(&self) -> f64 {
        TAU * self.frequency / self.sample_rate
    }

    pub fn is_enabled(&self) -> bool {
        self.params.enabled.get()
    }

    pub fn amplitude(&self) -> f64 {
        self.params.amplitude.get()
    }

    pub fn modulation_ratio(&self) -> f64 {
        self.params.modulation_ratio.get()
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Accumulated phase of `channel`; 0.0 for channels the signal does not track.
    pub fn phase(&self, channel: usize) -> f64 {
        self.phase.get(channel).copied().unwrap_or_default()
    }

    pub fn has_generator(&self) -> bool {
        self.generate.is_some()
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    pub fn modulation(&self) -> Option<&Signal> {
        self.modulation.as_deref()
    }

    pub fn modulation_mut(&mut self) -> Option<&mut Signal> {
        self.modulation.as_deref_mut()
    }

    pub fn params(&self) -> &Arc<SignalParams> {
        &self.params
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("enabled", &self.is_enabled())
            .field("frequency", &self.frequency)
            .field("amplitude", &self.amplitude())
            .field("phase", &self.phase)
            .field("modulation", &self.modulation)
            .finish_non_exhaustive()
    }
}
