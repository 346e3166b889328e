//! Duo - audio stream setup and keyboard loop

use std::io::{stdout, Write};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::{
    cursor::MoveToColumn,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{self, Clear, ClearType},
    ExecutableCommand,
};
use rtrb::Producer;

use duo_fm::{
    dsp::Waveform,
    synth::{FmSynth, SynthMessage},
    ParamStore, SynthConfig,
};

/// Keys of one octave laid out like a piano: white keys on the home row,
/// black keys on the row above.
const KEYMAP: [(char, u8); 13] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
];

const RATIO_STEP: f64 = 0.5;
const DEPTH_STEP: f64 = 0.25;

pub struct Duo {
    config: SynthConfig,
    octave: u8,
}

impl Duo {
    pub fn new() -> Self {
        Self {
            config: SynthConfig::default(),
            octave: 4,
        }
    }

    pub fn carrier(mut self, waveform: Waveform) -> Self {
        self.config = self.config.carrier(waveform);
        self
    }

    pub fn modulator(mut self, waveform: Waveform) -> Self {
        self.config = self.config.modulator(Some(waveform));
        self
    }

    pub fn octave(mut self, octave: u8) -> Self {
        self.octave = octave.min(9);
        self
    }

    /// Open the default output device and play until Q or Esc.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let supported = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(eyre!(
                "unsupported sample format {:?}, need f32",
                supported.sample_format()
            ));
        }

        let sample_rate = supported.sample_rate().0 as f64;
        let channels = supported.channels() as usize;

        println!("=== duo ===");
        println!("Sample rate: {} Hz", sample_rate);
        println!("Channels: {}", channels);
        println!();
        println!("  a w s e d f t g y h u j k   play");
        println!("  space                       release");
        println!("  m / v                       toggle modulator / envelope");
        println!("  [ ]  - =                    ratio / depth");
        println!("  q, esc                      quit");
        println!();

        let (mut synth, tx) = FmSynth::with_queue(self.config.clone().sample_rate(sample_rate));
        let params = synth.params().clone();

        let stream = device.build_output_stream(
            &supported.into(),
            move |data: &mut [f32], _| synth.render_interleaved(data, channels),
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;
        stream.play().wrap_err("failed to start output stream")?;

        terminal::enable_raw_mode().wrap_err("failed to enter raw mode")?;
        let result = self.keyboard_loop(tx, &params);
        terminal::disable_raw_mode()?;
        println!();

        result
    }

    fn keyboard_loop(&self, mut tx: Producer<SynthMessage>, params: &ParamStore) -> EyreResult<()> {
        let base_note = 12 * (self.octave + 1);
        draw_status(params, None)?;

        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            let mut playing = None;
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char(' ') => send(&mut tx, SynthMessage::AllNotesOff),
                KeyCode::Char('m') => toggle(params, "carrier_mod_enabled")?,
                KeyCode::Char('v') => toggle(params, "carrier_envelope_enabled")?,
                KeyCode::Char('[') => nudge(params, "carrier_modulation_ratio", -RATIO_STEP)?,
                KeyCode::Char(']') => nudge(params, "carrier_modulation_ratio", RATIO_STEP)?,
                KeyCode::Char('-') => nudge(params, "carrier_mod_amplitude", -DEPTH_STEP)?,
                KeyCode::Char('=') => nudge(params, "carrier_mod_amplitude", DEPTH_STEP)?,
                KeyCode::Char(c) => {
                    if let Some(&(_, offset)) = KEYMAP.iter().find(|(key, _)| *key == c) {
                        let note = base_note + offset;
                        send(&mut tx, SynthMessage::NoteOn { note, velocity: 100 });
                        playing = Some(note);
                    }
                }
                _ => {}
            }

            draw_status(params, playing)?;
        }
    }
}

impl Default for Duo {
    fn default() -> Self {
        Self::new()
    }
}

fn send(tx: &mut Producer<SynthMessage>, msg: SynthMessage) {
    if tx.push(msg).is_err() {
        log::warn!("message queue full, dropped {msg:?}");
    }
}

fn toggle(params: &ParamStore, id: &str) -> EyreResult<()> {
    let current = params.get(id)?;
    params.set(id, 1.0 - current)?;
    Ok(())
}

fn nudge(params: &ParamStore, id: &str, step: f64) -> EyreResult<()> {
    let current = params.get(id)?;
    params.set(id, current + step)?;
    Ok(())
}

fn draw_status(params: &ParamStore, note: Option<u8>) -> EyreResult<()> {
    let on_off = |id: &str| -> EyreResult<&'static str> {
        Ok(if params.get(id)? > 0.5 { "on " } else { "off" })
    };

    let mut out = stdout();
    out.execute(MoveToColumn(0))?;
    out.execute(Clear(ClearType::CurrentLine))?;
    write!(
        out,
        "note {:>4} | modulator {} ratio {:>5.2} depth {:>5.2} | envelope {}",
        note.map_or_else(|| "-".to_string(), |n| n.to_string()),
        on_off("carrier_mod_enabled")?,
        params.get("carrier_modulation_ratio")?,
        params.get("carrier_mod_amplitude")?,
        on_off("carrier_envelope_enabled")?,
    )?;
    out.flush()?;
    Ok(())
}
