use std::collections::VecDeque;

use duo_fm::{
    synth::{FmSynth, SynthMessage},
    SynthConfig,
};

const SAMPLE_RATE: f64 = 48_000.0;
const BLOCK: usize = 256;

fn synth_with(messages: &[SynthMessage]) -> FmSynth<VecDeque<SynthMessage>> {
    FmSynth::new(
        SynthConfig::new().sample_rate(SAMPLE_RATE),
        messages.iter().copied().collect(),
    )
}

fn render_blocks(
    synth: &mut FmSynth<VecDeque<SynthMessage>>,
    blocks: usize,
) -> (Vec<f32>, Vec<f32>) {
    let mut left_all = Vec::with_capacity(blocks * BLOCK);
    let mut right_all = Vec::with_capacity(blocks * BLOCK);
    let mut left = [0.0f32; BLOCK];
    let mut right = [0.0f32; BLOCK];

    for _ in 0..blocks {
        synth.render_block(&mut [&mut left[..], &mut right[..]]);
        left_all.extend_from_slice(&left);
        right_all.extend_from_slice(&right);
    }
    (left_all, right_all)
}

#[test]
fn renders_bounded_audio_for_a_held_note() {
    let mut synth = synth_with(&[SynthMessage::NoteOn { note: 60, velocity: 100 }]);
    let (left, right) = render_blocks(&mut synth, 40);

    assert!(left.iter().any(|s| s.abs() > 0.0));
    // Default carrier amplitude is 0.5 and the envelope peaks at 1.0.
    assert!(left.iter().chain(&right).all(|s| s.abs() <= 0.5 + 1e-6));
}

#[test]
fn both_channels_render_the_same_voice() {
    let mut synth = synth_with(&[SynthMessage::NoteOn { note: 64, velocity: 100 }]);
    synth.params().set("carrier_mod_enabled", 1.0).unwrap();
    let (left, right) = render_blocks(&mut synth, 20);

    assert_eq!(left, right);
}

#[test]
fn rendering_is_deterministic() {
    let messages = [SynthMessage::NoteOn { note: 45, velocity: 80 }];
    let mut a = synth_with(&messages);
    let mut b = synth_with(&messages);
    for synth in [&mut a, &mut b] {
        synth.params().set("carrier_mod_enabled", 1.0).unwrap();
        synth.params().set("carrier_modulation_ratio", 2.0).unwrap();
    }

    assert_eq!(render_blocks(&mut a, 10), render_blocks(&mut b, 10));
}

#[test]
fn enabling_the_modulator_changes_the_timbre() {
    let messages = [SynthMessage::NoteOn { note: 69, velocity: 100 }];
    let mut plain = synth_with(&messages);
    let mut fm = synth_with(&messages);
    fm.params().set("carrier_mod_enabled", 1.0).unwrap();
    fm.params().set("carrier_mod_amplitude", 1.5).unwrap();

    let (plain, _) = render_blocks(&mut plain, 8);
    let (fm, _) = render_blocks(&mut fm, 8);

    let difference: f32 = plain.iter().zip(&fm).map(|(a, b)| (a - b).abs()).sum();
    assert!(difference > 1.0, "modulated output barely differs: {difference}");
}

#[test]
fn release_tail_decays_to_silence() {
    let mut synth = synth_with(&[SynthMessage::NoteOn { note: 69, velocity: 100 }]);
    render_blocks(&mut synth, 20);

    // Still in decay here, which finishes before the release starts.
    synth.handle_message(SynthMessage::NoteOff { note: 69 });
    let (left, _) = render_blocks(&mut synth, (8.0 * SAMPLE_RATE) as usize / BLOCK);

    let tail = &left[left.len() - BLOCK..];
    assert!(tail.iter().all(|&s| s == 0.0));
    assert!(!synth.is_sounding());
}

#[test]
fn disabled_carrier_is_silent_through_the_parameter_surface() {
    let mut synth = synth_with(&[SynthMessage::NoteOn { note: 69, velocity: 100 }]);
    render_blocks(&mut synth, 4);

    synth.params().set("carrier_enabled", 0.0).unwrap();
    let (left, right) = render_blocks(&mut synth, 4);

    assert!(left.iter().chain(&right).all(|&s| s == 0.0));
    assert_eq!(synth.carrier().phase(0), 0.0);
    assert_eq!(synth.carrier().phase(1), 0.0);
}
