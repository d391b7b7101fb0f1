use vox_fx::{apply, EffectConfig, SampleBuffer};

fn all_on() -> EffectConfig {
    EffectConfig {
        pitch_factor: 1.3,
        speed_factor: 0.7,
        volume: 1.8,
        ..Default::default()
    }
    .with_reverb(6.5)
    .with_echo()
    .with_distortion(4.0)
}

fn tone(len: usize, rate: u32) -> SampleBuffer {
    let s = (0..len)
        .map(|i| (i as f32 * 0.05).sin() * 0.8)
        .collect();
    SampleBuffer::new(s, rate).unwrap()
}

#[test]
fn neutral_config_round_trips() {
    let input = tone(1000, 8000);
    assert_eq!(apply(&input, &EffectConfig::default()).unwrap(), input);
}

#[test]
fn silence_is_a_fixed_point() {
    let input = SampleBuffer::silence(44100, 44100).unwrap();
    let out = apply(&input, &all_on()).unwrap();
    assert!(!out.is_empty());
    assert!(out.samples().iter().all(|&s| s == 0.0));
}

#[test]
fn empty_buffer_through_everything() {
    let input = SampleBuffer::new(Vec::new(), 44100).unwrap();
    let out = apply(&input, &all_on()).unwrap();
    assert!(out.is_empty());
    assert_eq!(out.sample_rate(), 44100);
}

#[test]
fn saturated_distortion_scenario() {
    let input = SampleBuffer::new(vec![1.0; 4], 10).unwrap();
    let cfg = EffectConfig::default().with_distortion(5.0);
    assert_eq!(apply(&input, &cfg).unwrap().samples(), &[1.0; 4]);
}

#[test]
fn pitch_two_on_ramp() {
    let input = SampleBuffer::new((0..8).map(|i| i as f32).collect(), 10).unwrap();
    let cfg = EffectConfig { pitch_factor: 2.0, ..Default::default() };
    assert_eq!(apply(&input, &cfg).unwrap().samples(), &[0.0, 2.0, 4.0, 6.0]);
}

#[test]
fn rate_is_preserved_and_input_untouched() {
    let input = tone(2205, 22050);
    let before = input.clone();
    let out = apply(&input, &all_on()).unwrap();
    assert_eq!(out.sample_rate(), 22050);
    assert_eq!(input, before);
}

#[test]
fn distortion_then_volume_bounds_output_by_volume() {
    let out = apply(&tone(4000, 8000), &all_on()).unwrap();
    assert!(out.peak() <= 1.8 + 1e-6);
}

#[test]
fn pitch_then_speed_lengths_compose() {
    let input = SampleBuffer::silence(1000, 1000).unwrap();
    let cfg = EffectConfig { pitch_factor: 2.0, speed_factor: 0.5, ..Default::default() };
    // 1000 -> 500 -> 1000 positions, the last rounds to 500 and is dropped
    assert_eq!(apply(&input, &cfg).unwrap().len(), 999);
}

#[test]
fn out_of_domain_amounts_pass_through() {
    let input = SampleBuffer::new(vec![0.5, -0.25], 10).unwrap();
    let cfg = EffectConfig { volume: 3.0, ..Default::default() };
    assert_eq!(apply(&input, &cfg).unwrap().samples(), &[1.5, -0.75]);
}
