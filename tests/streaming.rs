use std::time::Duration;

use brickwall::{AudioBuffer, LimitError, Limiter, LimiterConfig, LimiterState, Source};
use rstest::rstest;

mod test_support;
use test_support::{interleave, sine, SAMPLE_RATE};

fn program() -> AudioBuffer {
    interleave(
        SAMPLE_RATE,
        &[
            sine(110.0, 1.8, SAMPLE_RATE, 10_000),
            sine(660.0, 0.4, SAMPLE_RATE, 10_000),
        ],
    )
}

fn config() -> LimiterConfig {
    LimiterConfig::default()
        .with_threshold(0.6)
        .with_attack(Duration::from_millis(2))
        .with_release(Duration::from_millis(30))
}

/// Splits `buffer` into consecutive chunks of `frames` frames.
fn chunks(buffer: &AudioBuffer, frames: usize) -> Vec<AudioBuffer> {
    let channels = buffer.channels() as usize;
    buffer
        .samples()
        .chunks(frames * channels)
        .map(|chunk| AudioBuffer::new(buffer.channels(), buffer.sample_rate(), chunk).unwrap())
        .collect()
}

#[rstest]
fn chunked_matches_whole(#[values(1, 7, 256, 4_096, 10_000)] chunk_frames: usize) {
    let input = program();
    let limiter = Limiter::new(config(), SAMPLE_RATE).unwrap().with_traces(true);
    let whole = limiter.process(&input).unwrap();

    let mut state = LimiterState::new(input.channels());
    let mut samples = Vec::new();
    let mut warnings = Vec::new();
    let mut gains = vec![Vec::new(); 2];
    for chunk in chunks(&input, chunk_frames) {
        let output = limiter.process_chunk(&chunk, &mut state).unwrap();
        samples.extend_from_slice(output.buffer.samples());
        warnings.extend(output.warnings);
        for (gain, trace) in gains.iter_mut().zip(output.traces.unwrap()) {
            gain.extend(trace.gain);
        }
    }

    assert_eq!(whole.buffer.samples(), &samples[..]);
    assert!(!whole.warnings.is_empty());
    assert_eq!(whole.warnings, warnings);
    assert_eq!(state.frames_processed(), input.frame_count());
    for (channel, gain) in gains.iter().enumerate() {
        assert_eq!(&whole.traces.as_ref().unwrap()[channel].gain, gain);
    }
}

#[test]
fn dropping_state_between_chunks_restarts_the_recurrence() {
    let input = program();
    let limiter = Limiter::new(config(), SAMPLE_RATE).unwrap();
    let parts = chunks(&input, 5_000);

    let mut state = LimiterState::new(2);
    limiter.process_chunk(&parts[0], &mut state).unwrap();
    let carried = limiter.process_chunk(&parts[1], &mut state).unwrap();

    state.reset();
    let restarted = limiter.process_chunk(&parts[1], &mut state).unwrap();
    let fresh = limiter.process(&parts[1]).unwrap();

    assert_eq!(restarted, fresh);
    assert_ne!(carried.buffer, fresh.buffer);
}

#[test]
fn state_exposes_the_carried_envelope() {
    let limiter = Limiter::new(config(), SAMPLE_RATE).unwrap().with_traces(true);
    let mut state = LimiterState::new(2);
    let output = limiter.process_chunk(&program(), &mut state).unwrap();
    let traces = output.traces.unwrap();

    for (channel, trace) in traces.iter().enumerate() {
        let carried = state.channel(channel).unwrap();
        assert_eq!(carried.envelope(), trace.envelope.last().copied());
        assert_eq!(carried.gain(), trace.gain.last().copied());
    }
}

#[test]
fn mismatched_state_is_rejected() {
    let limiter = Limiter::new(config(), SAMPLE_RATE).unwrap();
    let mut state = LimiterState::new(1);
    assert_eq!(
        limiter.process_chunk(&program(), &mut state),
        Err(LimitError::ChannelMismatch {
            expected: 1,
            found: 2
        })
    );
}

#[test]
fn source_adapter_matches_batch() {
    let input = program();
    let batch = Limiter::new(config(), SAMPLE_RATE)
        .unwrap()
        .process(&input)
        .unwrap();

    let mut limited = input.into_source().limit(config()).unwrap();
    assert_eq!(limited.channels(), 2);
    assert_eq!(limited.sample_rate(), SAMPLE_RATE);

    let head: Vec<f32> = limited.by_ref().take(1_001).collect();
    let tail: Vec<f32> = limited.by_ref().collect();
    assert_eq!(head.len() + tail.len(), batch.buffer.samples().len());
    assert_eq!(&batch.buffer.samples()[..1_001], &head[..]);
    assert_eq!(&batch.buffer.samples()[1_001..], &tail[..]);
}

#[test]
fn source_state_resumes_in_batch() {
    // pull the first half through the adapter, finish with the batch limiter
    let input = program();
    let parts = chunks(&input, 5_000);
    let limiter = Limiter::new(config(), SAMPLE_RATE).unwrap();
    let whole = limiter.process(&input).unwrap();

    let mut limited = parts[0].clone().into_source().limit(config()).unwrap();
    let head: Vec<f32> = limited.by_ref().collect();
    let mut state = limited.into_state();
    assert_eq!(state.frames_processed(), 5_000);
    let tail = limiter.process_chunk(&parts[1], &mut state).unwrap();

    assert_eq!(&whole.buffer.samples()[..head.len()], &head[..]);
    assert_eq!(&whole.buffer.samples()[head.len()..], tail.buffer.samples());

    // warnings from the batch half keep counting frames where the adapter stopped
    let tail_warnings: Vec<_> = whole
        .warnings
        .iter()
        .filter(|w| w.frame >= 5_000)
        .copied()
        .collect();
    assert!(!tail_warnings.is_empty());
    assert_eq!(tail.warnings, tail_warnings);
}
