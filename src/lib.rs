pub mod config;
pub mod dsp;
pub mod error;
pub mod params; // Lock-free parameter cells and the named surface
pub mod synth; // Note handling and block rendering around the carrier

pub use config::SynthConfig;
pub use error::ParamError;
pub use params::{ParamSnapshot, ParamStore};

/// Independent output channels each signal and envelope keeps state for.
pub const NUM_CHANNELS: usize = 2;
/// Shortest attack, decay or release time accepted by the setters, in seconds.
pub const MIN_TIME: f64 = 0.001;
