//! duo - play the FM voice from the terminal keyboard
//!
//! Run with: cargo run --bin duo

mod app;

use app::Duo;
use duo_fm::dsp::Waveform;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    Duo::new()
        .carrier(Waveform::Sine)
        .modulator(Waveform::Sine)
        .octave(4)
        .run()
}
