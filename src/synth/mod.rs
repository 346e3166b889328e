// Purpose: host-facing layer around the carrier signal
// Tracks the held note, drains control messages, renders blocks

pub mod fm;
pub mod message;

pub use fm::FmSynth;
pub use message::{MessageReceiver, SynthMessage};
