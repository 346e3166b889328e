use std::f64::consts::TAU;

use duo_fm::dsp::{waveform, Envelope, EnvelopeState, Signal};

#[test]
fn adsr_scenario_at_one_kilohertz() {
    const SR: f64 = 1_000.0;
    let mut env = Envelope::adsr(0.1, 0.1, 0.5, 0.2);

    // Attack: 1 / (0.1 × 1000) per sample reaches full level after 100 steps.
    let mut value = 0.0;
    let mut calls = 0;
    while env.state(0) != EnvelopeState::Decay {
        value = env.coefficient(0, SR, true);
        calls += 1;
        assert!(calls < 200, "attack never finished");
    }
    assert_eq!(value, 1.0);
    assert!((101..=103).contains(&calls), "attack took {calls} calls");

    // Decay closes 1% of the gap to sustain per sample.
    for _ in 0..100 {
        value = env.coefficient(0, SR, true);
    }
    let expected = 0.5 + 0.5 * 0.99_f64.powi(100);
    assert!((value - expected).abs() < 1e-9);

    while env.state(0) != EnvelopeState::Sustain {
        value = env.coefficient(0, SR, true);
    }
    assert_eq!(value, 0.5);

    // Release uses the same one-pole approach, towards zero.
    let mut previous = env.coefficient(0, SR, false);
    assert_eq!(env.state(0), EnvelopeState::Release);
    for _ in 0..50 {
        let next = env.coefficient(0, SR, false);
        assert!((next - previous * (1.0 - 1.0 / (0.2 * SR))).abs() < 1e-12);
        previous = next;
    }

    while env.state(0) != EnvelopeState::Idle {
        env.coefficient(0, SR, false);
    }
    assert_eq!(env.value(0), 0.0);
}

#[test]
fn fm_increment_scenario() {
    const SR: f64 = 44_100.0;
    let mut carrier = Signal::new(waveform::sine, SR);
    carrier.enable_modulation(waveform::sine);
    carrier.modulation_mut().unwrap().set_enabled(true);
    carrier.set_modulation_ratio(0.5);
    carrier.update_frequency(440.0);

    let modulation = carrier.modulation().unwrap();
    let expected = TAU * 220.0 / SR;
    assert!((modulation.phase_increment() - expected).abs() <= f64::EPSILON);

    let before = modulation.phase(0);
    carrier.sample(0, true);
    let after = carrier.modulation().unwrap().phase(0);
    assert!((after - before - expected).abs() <= f64::EPSILON);
}

#[test]
fn disabling_envelope_in_any_state_bypasses() {
    for hold in [0, 1, 50, 150, 2_000] {
        let mut env = Envelope::adsr(0.1, 0.1, 0.5, 0.2);
        for _ in 0..hold {
            env.coefficient(0, 1_000.0, true);
        }
        for _ in 0..10 {
            env.coefficient(0, 1_000.0, false);
        }

        env.set_enabled(false);
        assert_eq!(env.state(0), EnvelopeState::Idle);
        assert_eq!(env.value(0), 0.0);
        assert_eq!(env.coefficient(0, 1_000.0, true), 1.0);
        assert_eq!(env.coefficient(0, 1_000.0, false), 1.0);
    }
}

#[test]
fn zero_amplitude_silences_every_channel_and_gate() {
    let mut signal = Signal::new(waveform::saw, 48_000.0);
    signal.update_amplitude(0.0);

    for n in 0..1_000 {
        for channel in 0..2 {
            assert_eq!(signal.sample(channel, n % 7 < 4), 0.0);
        }
    }
}
