#![allow(dead_code)]
/// in separate folder so its not ran as integration test
use brickwall::{AudioBuffer, ChannelCount, Sample, SampleRate};

pub const SAMPLE_RATE: SampleRate = 44_100;

/// `len` samples of a constant value.
pub fn constant(value: Sample, len: usize) -> Vec<Sample> {
    vec![value; len]
}

/// Silence for `silent` samples, then `value` for `loud` samples.
pub fn step(silent: usize, loud: usize, value: Sample) -> Vec<Sample> {
    let mut samples = constant(0.0, silent);
    samples.extend(constant(value, loud));
    samples
}

/// A sine wave of `len` samples.
pub fn sine(frequency: f32, amplitude: f32, sample_rate: SampleRate, len: usize) -> Vec<Sample> {
    (0..len)
        .map(|n| {
            let phase = 2.0 * std::f32::consts::PI * frequency * n as f32 / sample_rate as f32;
            amplitude * phase.sin()
        })
        .collect()
}

/// Interleaves equally long channels into one buffer.
pub fn interleave(sample_rate: SampleRate, channels: &[Vec<Sample>]) -> AudioBuffer {
    let len = channels.first().map(Vec::len).unwrap_or_default();
    assert!(channels.iter().all(|c| c.len() == len));

    let data: Vec<Sample> = (0..len)
        .flat_map(|n| channels.iter().map(move |c| c[n]))
        .collect();
    AudioBuffer::new(channels.len() as ChannelCount, sample_rate, data)
        .expect("channels form whole frames")
}

pub fn peak(samples: impl IntoIterator<Item = Sample>) -> Sample {
    samples.into_iter().fold(0.0f32, |acc, x| acc.max(x.abs()))
}

// test for your tests of course
#[test]
fn interleave_orders_frames() {
    let buffer = interleave(1, &[vec![1.0, 2.0], vec![-1.0, -2.0]]);
    assert_eq!(buffer.samples(), &[1.0, -1.0, 2.0, -2.0]);
}

#[test]
fn step_has_requested_shape() {
    let samples = step(3, 2, 0.7);
    assert_eq!(samples, vec![0.0, 0.0, 0.0, 0.7, 0.7]);
}
