use std::sync::Arc;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    config::SynthConfig,
    dsp::{envelope::EnvelopeState, signal::Signal},
    params::{ParamStore, SignalParams, CARRIER},
    synth::message::{MessageReceiver, SynthMessage},
    NUM_CHANNELS,
};

/// Monophonic two-operator FM synth: one carrier, one optional modulator.
///
/// The audio thread owns this value and calls [`render_block`](Self::render_block);
/// other threads talk to it through the message queue (notes) and a clone of
/// [`params`](Self::params) (everything else).
pub struct FmSynth<R: MessageReceiver> {
    config: SynthConfig,
    carrier: Signal,
    params: ParamStore,
    rx: R,
    note: Option<u8>,
    bend_cents: f64,
}

impl<R: MessageReceiver> FmSynth<R> {
    pub fn new(config: SynthConfig, rx: R) -> Self {
        let signal_params = Arc::new(SignalParams::carrier());
        let params = ParamStore::for_signal(CARRIER, &signal_params);

        let mut carrier = Signal::with_params(
            config.carrier_waveform.generator(),
            config.sample_rate,
            signal_params,
        );
        if let Some(waveform) = config.modulator_waveform {
            carrier.enable_modulation(waveform.generator());
        }

        log::info!(
            "fm synth ready: {} Hz, carrier {:?}, modulator {:?}, {} parameters",
            config.sample_rate,
            config.carrier_waveform,
            config.modulator_waveform,
            params.len()
        );

        Self {
            config,
            carrier,
            params,
            rx,
            note: None,
            bend_cents: 0.0,
        }
    }

    /// Named surface over the live cells; clone it for other threads.
    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    pub fn carrier(&self) -> &Signal {
        &self.carrier
    }

    pub fn carrier_mut(&mut self) -> &mut Signal {
        &mut self.carrier
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Host is (re)preparing playback at a new rate.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.config.sample_rate = sample_rate;
        self.carrier.set_sample_rate(sample_rate);
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn is_note_on(&self) -> bool {
        self.note.is_some()
    }

    pub fn envelope_state(&self, channel: usize) -> EnvelopeState {
        self.carrier.envelope().state(channel)
    }

    /// Still audible: gate held, or the carrier envelope is releasing.
    pub fn is_sounding(&self) -> bool {
        self.is_note_on()
            || (self.carrier.envelope().is_enabled()
                && (0..NUM_CHANNELS).any(|ch| self.carrier.envelope().is_active(ch)))
    }

    pub fn handle_message(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { note, .. } => {
                self.note = Some(note);
                self.retune();
            }
            SynthMessage::NoteOff { note } => {
                // Last-note priority: releasing an older key does nothing.
                if self.note == Some(note) {
                    self.note = None;
                }
            }
            SynthMessage::PitchBend { cents } => {
                self.bend_cents = cents;
                self.retune();
            }
            SynthMessage::AllNotesOff => {
                self.note = None;
            }
        }
    }

    fn retune(&mut self) {
        if let Some(note) = self.note {
            let frequency =
                self.config.note_to_frequency(note) * 2.0_f64.powf(self.bend_cents / 1200.0);
            self.carrier.update_frequency(frequency);
        }
    }

    fn process_messages(&mut self) {
        while let Some(msg) = self.rx.pop() {
            self.handle_message(msg);
        }
    }

    /// Render one block into planar channel buffers.
    ///
    /// Only the first [`NUM_CHANNELS`] buffers carry signal; any further
    /// channels are zeroed.
    pub fn render_block(&mut self, outputs: &mut [&mut [f32]]) {
        self.process_messages();

        let sample_rate = self.config.sample_rate;
        let is_note_on = self.is_note_on();

        for (channel, out) in outputs.iter_mut().enumerate() {
            if channel >= NUM_CHANNELS {
                out.fill(0.0);
                continue;
            }
            for sample in out.iter_mut() {
                *sample = self.carrier.render(channel, sample_rate, is_note_on) as f32;
            }
        }
    }

    /// Render into an interleaved buffer of `channels` channels (cpal layout).
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        self.process_messages();
        if channels == 0 {
            return;
        }

        let sample_rate = self.config.sample_rate;
        let is_note_on = self.is_note_on();

        for frame in data.chunks_mut(channels) {
            for (channel, sample) in frame.iter_mut().enumerate() {
                *sample = if channel < NUM_CHANNELS {
                    self.carrier.render(channel, sample_rate, is_note_on) as f32
                } else {
                    0.0
                };
            }
        }
    }
}

#[cfg(feature = "rtrb")]
impl FmSynth<Consumer<SynthMessage>> {
    /// Synth plus the producer end of its message queue.
    pub fn with_queue(config: SynthConfig) -> (Self, Producer<SynthMessage>) {
        let (tx, rx) = RingBuffer::<SynthMessage>::new(config.queue_capacity);
        (Self::new(config, rx), tx)
    }
}
