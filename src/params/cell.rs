use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// An `f64` stored as its bit pattern in an `AtomicU64`.
///
/// Loads and stores are `Relaxed`: the audio thread only needs *a* recent
/// value, never a value ordered against other parameters.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Closed interval a float parameter is clamped into on write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Lock-free float parameter cell shared between control and audio threads.
#[derive(Debug)]
pub struct FloatParam {
    value: AtomicF64,
    range: ParamRange,
    default: f64,
}

impl FloatParam {
    pub fn new(default: f64, range: ParamRange) -> Self {
        let default = range.clamp(default);
        Self {
            value: AtomicF64::new(default),
            range,
            default,
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.value.load()
    }

    /// Store `value` clamped into the parameter range; returns what was stored.
    ///
    /// NaN is stored as the default.
    pub fn set(&self, value: f64) -> f64 {
        let stored = if value.is_nan() {
            self.default
        } else {
            self.range.clamp(value)
        };
        self.value.store(stored);
        stored
    }

    pub fn range(&self) -> ParamRange {
        self.range
    }

    pub fn default_value(&self) -> f64 {
        self.default
    }
}

/// Lock-free on/off parameter cell.
///
/// Every write of `false` also bumps a disable counter. A reader that only
/// polls the flag can miss an off/on pair written between two of its calls;
/// comparing [`disable_count`](Self::disable_count) against the last count it
/// saw tells it a disable happened anyway.
#[derive(Debug)]
pub struct BoolParam {
    value: AtomicBool,
    disables: AtomicU32,
    default: bool,
}

impl BoolParam {
    pub fn new(default: bool) -> Self {
        Self {
            value: AtomicBool::new(default),
            disables: AtomicU32::new(0),
            default,
        }
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Relaxed);
        if !value {
            // Release: a reader that sees the new count also sees `false`
            // (or a later write).
            self.disables.fetch_add(1, Ordering::Release);
        }
    }

    /// Number of `false` writes so far, wrapping.
    #[inline]
    pub fn disable_count(&self) -> u32 {
        self.disables.load(Ordering::Acquire)
    }

    pub fn default_value(&self) -> bool {
        self.default
    }
}
