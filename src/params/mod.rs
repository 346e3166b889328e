//! Live parameter cells and the named parameter surface.
//!
//! Every externally mutable value the render path reads lives in a lock-free
//! cell. The cells are grouped per voice role (`SignalParams`, which owns its
//! `EnvelopeParams`) and shared through `Arc` between the audio-side
//! [`Signal`](crate::dsp::signal::Signal) and any number of control-side
//! handles. [`ParamStore`] maps string ids such as `carrier_envelope_attack`
//! onto those same cells so a host, a GUI or a preset loader can read and
//! write them by name.

use std::collections::BTreeMap;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParamError;

mod cell;

pub use cell::{AtomicF64, BoolParam, FloatParam, ParamRange};

/// Role name of the top-level signal.
pub const CARRIER: &str = "carrier";
/// Suffix appended to a parent role to name its modulator.
pub const MODULATION_SUFFIX: &str = "_mod";

pub const AMPLITUDE_RANGE: ParamRange = ParamRange::new(-10.0, 10.0);
pub const MODULATION_RATIO_RANGE: ParamRange = ParamRange::new(0.01, 16.0);
pub const TIME_RANGE: ParamRange = ParamRange::new(crate::MIN_TIME, 10.0);
pub const SUSTAIN_RANGE: ParamRange = ParamRange::new(0.0, 1.0);

/// Range used for the on/off parameters when read as numbers.
const BOOL_RANGE: ParamRange = ParamRange::new(0.0, 1.0);

/// ADSR cells for one envelope.
#[derive(Debug)]
pub struct EnvelopeParams {
    pub enabled: BoolParam,
    pub attack: FloatParam,
    pub decay: FloatParam,
    pub sustain: FloatParam,
    pub release: FloatParam,
}

impl EnvelopeParams {
    pub fn new(enabled: bool, attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            enabled: BoolParam::new(enabled),
            attack: FloatParam::new(attack, TIME_RANGE),
            decay: FloatParam::new(decay, TIME_RANGE),
            sustain: FloatParam::new(sustain, SUSTAIN_RANGE),
            release: FloatParam::new(release, TIME_RANGE),
        }
    }
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self::new(true, 0.1, 0.1, 0.5, 0.2)
    }
}

/// Cells for one oscillating voice role (carrier or modulator).
///
/// A carrier's params carry the params of its (possibly not yet constructed)
/// modulator; a modulator's `modulation` is `None`, which is what caps the
/// nesting at one level.
#[derive(Debug)]
pub struct SignalParams {
    pub enabled: BoolParam,
    pub amplitude: FloatParam,
    pub modulation_ratio: FloatParam,
    pub envelope: Arc<EnvelopeParams>,
    pub modulation: Option<Arc<SignalParams>>,
}

impl SignalParams {
    /// Audible top-level signal with an (initially disabled) modulator slot.
    pub fn carrier() -> Self {
        Self {
            enabled: BoolParam::new(true),
            amplitude: FloatParam::new(0.5, AMPLITUDE_RANGE),
            modulation_ratio: FloatParam::new(1.0, MODULATION_RATIO_RANGE),
            envelope: Arc::new(EnvelopeParams::default()),
            modulation: Some(Arc::new(Self::modulator())),
        }
    }

    /// Modulator role: disabled, unit depth, envelope off so it free-runs.
    pub fn modulator() -> Self {
        Self {
            enabled: BoolParam::new(false),
            amplitude: FloatParam::new(1.0, AMPLITUDE_RANGE),
            modulation_ratio: FloatParam::new(1.0, MODULATION_RATIO_RANGE),
            envelope: Arc::new(EnvelopeParams {
                enabled: BoolParam::new(false),
                ..EnvelopeParams::default()
            }),
            modulation: None,
        }
    }
}

/// A parameter as seen through the named surface.
#[derive(Debug, Clone)]
pub enum ParamHandle {
    Float(Arc<SignalParams>, SignalField),
    EnvelopeFloat(Arc<EnvelopeParams>, EnvelopeField),
    Bool(Arc<SignalParams>),
    EnvelopeBool(Arc<EnvelopeParams>),
}

/// Float cells of a [`SignalParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalField {
    Amplitude,
    ModulationRatio,
}

/// Float cells of an [`EnvelopeParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeField {
    Attack,
    Decay,
    Sustain,
    Release,
}

impl ParamHandle {
    fn float(&self) -> Option<&FloatParam> {
        match self {
            ParamHandle::Float(signal, SignalField::Amplitude) => Some(&signal.amplitude),
            ParamHandle::Float(signal, SignalField::ModulationRatio) => {
                Some(&signal.modulation_ratio)
            }
            ParamHandle::EnvelopeFloat(env, EnvelopeField::Attack) => Some(&env.attack),
            ParamHandle::EnvelopeFloat(env, EnvelopeField::Decay) => Some(&env.decay),
            ParamHandle::EnvelopeFloat(env, EnvelopeField::Sustain) => Some(&env.sustain),
            ParamHandle::EnvelopeFloat(env, EnvelopeField::Release) => Some(&env.release),
            ParamHandle::Bool(_) | ParamHandle::EnvelopeBool(_) => None,
        }
    }

    fn flag(&self) -> Option<&BoolParam> {
        match self {
            ParamHandle::Bool(signal) => Some(&signal.enabled),
            ParamHandle::EnvelopeBool(env) => Some(&env.enabled),
            ParamHandle::Float(..) | ParamHandle::EnvelopeFloat(..) => None,
        }
    }

    /// Current value; on/off parameters read as `0.0`/`1.0`.
    pub fn get(&self) -> f64 {
        if let Some(flag) = self.flag() {
            return if flag.get() { 1.0 } else { 0.0 };
        }
        self.float().map_or(0.0, FloatParam::get)
    }

    /// Store `value`, returning what was actually stored after clamping.
    pub fn set(&self, value: f64) -> f64 {
        if let Some(flag) = self.flag() {
            let on = value > 0.5;
            flag.set(on);
            return if on { 1.0 } else { 0.0 };
        }
        self.float().map_or(0.0, |param| param.set(value))
    }

    pub fn range(&self) -> ParamRange {
        self.float().map_or(BOOL_RANGE, FloatParam::range)
    }

    pub fn default_value(&self) -> f64 {
        match self.flag() {
            Some(flag) => {
                if flag.default_value() {
                    1.0
                } else {
                    0.0
                }
            }
            None => self.float().map_or(0.0, FloatParam::default_value),
        }
    }
}

/// Plain copy of every parameter value, keyed by id.
///
/// This is what a persistence collaborator saves and restores; nothing in this
/// crate writes it anywhere.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSnapshot {
    pub values: BTreeMap<String, f64>,
}

/// Named view over the live parameter cells of a signal graph.
///
/// Cloning is cheap: clones share the same cells, so one clone can live on a
/// UI thread while the audio thread renders from the underlying `Signal`.
#[derive(Debug, Clone, Default)]
pub struct ParamStore {
    params: BTreeMap<String, ParamHandle>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store exposing `params` under `role`, including its modulator
    /// as `{role}_mod`.
    pub fn for_signal(role: &str, params: &Arc<SignalParams>) -> Self {
        let mut store = Self::new();
        store.register_signal(role, params);
        store
    }

    /// Register every cell of `params` (and, recursively, of its modulator).
    pub fn register_signal(&mut self, role: &str, params: &Arc<SignalParams>) {
        self.insert(format!("{role}_enabled"), ParamHandle::Bool(params.clone()));
        self.insert(
            format!("{role}_amplitude"),
            ParamHandle::Float(params.clone(), SignalField::Amplitude),
        );
        self.insert(
            format!("{role}_modulation_ratio"),
            ParamHandle::Float(params.clone(), SignalField::ModulationRatio),
        );
        self.register_envelope(role, &params.envelope);

        if let Some(modulation) = &params.modulation {
            self.register_signal(&format!("{role}{MODULATION_SUFFIX}"), modulation);
        }
    }

    fn register_envelope(&mut self, role: &str, env: &Arc<EnvelopeParams>) {
        self.insert(
            format!("{role}_envelope_enabled"),
            ParamHandle::EnvelopeBool(env.clone()),
        );
        for (name, field) in [
            ("attack", EnvelopeField::Attack),
            ("decay", EnvelopeField::Decay),
            ("sustain", EnvelopeField::Sustain),
            ("release", EnvelopeField::Release),
        ] {
            self.insert(
                format!("{role}_envelope_{name}"),
                ParamHandle::EnvelopeFloat(env.clone(), field),
            );
        }
    }

    fn insert(&mut self, id: String, handle: ParamHandle) {
        if self.params.insert(id.clone(), handle).is_some() {
            log::warn!("parameter `{id}` registered twice, keeping the latest cell");
        }
    }

    pub fn handle(&self, id: &str) -> Result<&ParamHandle, ParamError> {
        self.params
            .get(id)
            .ok_or_else(|| ParamError::UnknownParameter(id.to_owned()))
    }

    pub fn get(&self, id: &str) -> Result<f64, ParamError> {
        self.handle(id).map(ParamHandle::get)
    }

    /// Write `value` to `id`, clamping into the parameter's range.
    ///
    /// Returns the value actually stored.
    pub fn set(&self, id: &str, value: f64) -> Result<f64, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite {
                id: id.to_owned(),
                value,
            });
        }

        let handle = self.handle(id)?;
        let stored = handle.set(value);
        if stored != value && handle.flag().is_none() {
            log::warn!("parameter `{id}` clamped from {value} to {stored}");
        }
        Ok(stored)
    }

    pub fn range(&self, id: &str) -> Result<ParamRange, ParamError> {
        self.handle(id).map(ParamHandle::range)
    }

    /// All registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            values: self
                .params
                .iter()
                .map(|(id, handle)| (id.clone(), handle.get()))
                .collect(),
        }
    }

    /// Restore every value in `snapshot`.
    ///
    /// All known ids are applied even if some entries fail; the first error
    /// is returned.
    pub fn apply(&self, snapshot: &ParamSnapshot) -> Result<(), ParamError> {
        let mut first_error = None;
        for (id, &value) in &snapshot.values {
            if let Err(err) = self.set(id, value) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Put every parameter back to its default value.
    pub fn reset_to_defaults(&self) {
        for handle in self.params.values() {
            handle.set(handle.default_value());
        }
    }
}
