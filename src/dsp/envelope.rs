use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::approx::{approx_ge, approx_le},
    params::EnvelopeParams,
    NUM_CHANNELS,
};

/*
ADSR Envelope
=============

The envelope turns a note gate into a gain coefficient that the signal
multiplies into its output. It runs one independent state machine per output
channel; channels share parameters but never state.

Vocabulary
----------

  value       The coefficient for the current sample, 0.0 to 1.0.

  state       Idle, Attack, Decay, Sustain or Release.

  gate        `is_note_on`, sampled every call. There are no note_on/note_off
              events; the state machine reacts to the gate level it sees.

  bypass      A disabled envelope returns 1.0 so the signal passes through
              untouched. It does not mean silence.


The Shape
---------

  Value
    1.0 ┐    ╱╲
        │   ╱  ╲_
    S   │  ╱     ‾‾‾‾‾‾‾‾‾‾╲
        │ ╱                 ╲_
    0.0 └╱                    ‾‾‾──→ Time
        Attack Decay Sustain Release

Attack is a linear ramp:

    value += 1 / (attack * sample_rate)

Decay and Release are one-pole exponential approaches. Each sample closes a
fixed fraction of the remaining distance to the target:

    decay:    value -= (value - sustain) / (decay * sample_rate)
    release:  value -=  value            / (release * sample_rate)

After `decay * sample_rate` samples about 37% of the distance remains; the
stage only ends once the value is within the comparison tolerance of its
target (see `dsp::approx`), so floating-point residue cannot keep a stage
alive forever.


Transitions (checked in this order)
-----------------------------------

  Idle     gate on                 → Attack   value = 0
  Idle     gate off                → Idle     value = 0
  Attack   gate off                → Release  value kept
  Attack   value ≥ 1               → Decay    value = 1
  Decay    value ≤ sustain         → Sustain  value = sustain
  Sustain  gate off                → Release  value kept
  Release  gate on                 → Attack   value = 0 (audible retrigger)
  Release  value ≤ 0               → Idle     value = 0

Decay ignores the gate: a note released mid-decay finishes decaying to the
sustain level and only then moves to Release.
*/

/// Stage of one channel's envelope state machine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeState {
    #[default]
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Envelope {
    params: Arc<EnvelopeParams>,
    state: [EnvelopeState; NUM_CHANNELS],
    value: [f64; NUM_CHANNELS],
    /// Disable count of `params.enabled` last acted on.
    seen_disables: u32,
}

impl Envelope {
    /// Envelope with the default ADSR values and its own parameter cells.
    pub fn new() -> Self {
        Self::with_params(Arc::new(EnvelopeParams::default()))
    }

    /// Envelope reading its parameters from shared cells.
    pub fn with_params(params: Arc<EnvelopeParams>) -> Self {
        Self {
            seen_disables: params.enabled.disable_count(),
            params,
            state: [EnvelopeState::Idle; NUM_CHANNELS],
            value: [0.0; NUM_CHANNELS],
        }
    }

    pub fn adsr(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        let mut env = Self::new();
        env.set_parameters(attack, decay, sustain, release);
        env
    }

    /// Overwrite the four ADSR parameters without touching in-flight state.
    ///
    /// Times are clamped to at least [`MIN_TIME`](crate::MIN_TIME) seconds and
    /// sustain into `[0, 1]`.
    pub fn set_parameters(&mut self, attack: f64, decay: f64, sustain: f64, release: f64) {
        self.params.attack.set(attack);
        self.params.decay.set(decay);
        self.params.sustain.set(sustain);
        self.params.release.set(release);
    }

    /// Disabling drops both channels straight to Idle, even mid-release.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.params.enabled.set(enabled);
        if !enabled {
            self.reset();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.params.enabled.get()
    }

    /// Reset to Idle if the enabled cell was switched off since the last
    /// call, even if it has been switched back on in between.
    ///
    /// Covers disables written straight to the shared cells rather than
    /// through [`set_enabled`](Self::set_enabled).
    pub fn apply_pending_disable(&mut self) {
        let disables = self.params.enabled.disable_count();
        if disables != self.seen_disables {
            self.seen_disables = disables;
            self.reset();
        }
    }

    /// Advance `channel` by one sample and return its new coefficient.
    ///
    /// Returns 1.0 while disabled. Pending disables from the shared cells are
    /// applied first, so the state is Idle when the envelope is enabled again.
    pub fn coefficient(&mut self, channel: usize, sample_rate: f64, is_note_on: bool) -> f64 {
        self.apply_pending_disable();
        if !self.is_enabled() {
            self.reset();
            return 1.0;
        }

        debug_assert!(channel < NUM_CHANNELS, "channel {channel} out of range");
        if channel >= NUM_CHANNELS {
            return 0.0;
        }

        let state = &mut self.state[channel];
        let value = &mut self.value[channel];

        match *state {
            EnvelopeState::Idle => {
                if is_note_on {
                    *state = EnvelopeState::Attack;
                }
                *value = 0.0;
            }

            EnvelopeState::Attack => {
                if !is_note_on {
                    *state = EnvelopeState::Release;
                } else if approx_ge(*value, 1.0) {
                    *state = EnvelopeState::Decay;
                    *value = 1.0;
                } else {
                    *value += 1.0 / (self.params.attack.get() * sample_rate);
                }
            }

            EnvelopeState::Decay => {
                let sustain = self.params.sustain.get();
                if approx_le(*value, sustain) {
                    *state = EnvelopeState::Sustain;
                    *value = sustain;
                } else {
                    *value -= (*value - sustain) / (self.params.decay.get() * sample_rate);
                }
            }

            EnvelopeState::Sustain => {
                if !is_note_on {
                    *state = EnvelopeState::Release;
                }
            }

            // The disabled case never reaches here: the bypass check above
            // has already dropped every channel to Idle.
            EnvelopeState::Release => {
                if is_note_on {
                    *state = EnvelopeState::Attack;
                    *value = 0.0;
                } else if approx_le(*value, 0.0) {
                    *state = EnvelopeState::Idle;
                    *value = 0.0;
                } else {
                    *value -= *value / (self.params.release.get() * sample_rate);
                }
            }
        }

        *value
    }

    /// Fill `out` with consecutive coefficients for `channel`.
    pub fn render(&mut self, channel: usize, out: &mut [f64], sample_rate: f64, is_note_on: bool) {
        for sample in out.iter_mut() {
            *sample = self.coefficient(channel, sample_rate, is_note_on);
        }
    }

    /// Both channels back to Idle with a zero value.
    pub fn reset(&mut self) {
        self.state = [EnvelopeState::Idle; NUM_CHANNELS];
        self.value = [0.0; NUM_CHANNELS];
    }

    /// Stage of `channel`; Idle for channels the envelope does not track.
    pub fn state(&self, channel: usize) -> EnvelopeState {
        self.state.get(channel).copied().unwrap_or_default()
    }

    pub fn value(&self, channel: usize) -> f64 {
        self.value.get(channel).copied().unwrap_or_default()
    }

    /// Whether `channel` is producing anything other than Idle silence.
    pub fn is_active(&self, channel: usize) -> bool {
        self.state(channel) != EnvelopeState::Idle
    }

    pub fn attack(&self) -> f64 {
        self.params.attack.get()
    }

    pub fn decay(&self) -> f64 {
        self.params.decay.get()
    }

    pub fn sustain(&self) -> f64 {
        self.params.sustain.get()
    }

    pub fn release(&self) -> f64 {
        self.params.release.get()
    }

    pub fn params(&self) -> &Arc<EnvelopeParams> {
        &self.params
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
