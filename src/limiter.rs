//! Brick-wall limiting of whole buffers.
//!
//! The limiter runs three stages over every channel:
//!
//! 1. [`EnvelopeFollower`] tracks the rectified signal with asymmetric attack/release smoothing
//! 2. [`raw_gain`] and [`GainSmoother`] turn the envelope into a gain that holds the signal at the
//!    threshold
//! 3. [`MakeupAndClip`] applies the gain, scales the threshold back up to full scale and clips
//!    what is left over
//!
//! Channels never influence each other, so they are processed in parallel when the `parallel`
//! feature is enabled.
//!
//! # Usage
//!
//! ```rust
//! use brickwall::{AudioBuffer, Limiter, LimiterConfig};
//!
//! let input = AudioBuffer::mono(44_100, vec![0.0, 0.9, -1.4, 0.3]).unwrap();
//! let limiter = Limiter::new(LimiterConfig::default(), input.sample_rate())
//!     .unwrap()
//!     .with_traces(true);
//!
//! let output = limiter.process(&input).unwrap();
//! assert_eq!(output.buffer.frame_count(), 4);
//! assert!(output.buffer.samples().iter().all(|s| s.abs() <= 1.0));
//!
//! // -1.4 is out of range, reported but still processed
//! assert_eq!(output.warnings.len(), 1);
//! assert_eq!(output.warnings[0].frame, 2);
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::buffer::AudioBuffer;
use crate::common::{assert_error_traits, ChannelCount, Sample, SampleRate};
use crate::envelope::EnvelopeFollower;
use crate::gain::{raw_gain, GainSmoother};
use crate::makeup::MakeupAndClip;
use crate::settings::{Coefficients, ConfigError, LimiterConfig};
use crate::state::{ChannelState, LimiterState};

/// Error processing a buffer.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum LimitError {
    /// The configuration was rejected.
    #[error("invalid limiter configuration")]
    Config(#[from] ConfigError),
    /// The carried state tracks a different number of channels than the buffer has.
    #[error("state tracks {expected} channels but the buffer has {found}")]
    ChannelMismatch {
        /// Channels in the carried state
        expected: usize,
        /// Channels in the buffer
        found: ChannelCount,
    },
    /// The buffer was recorded at a different rate than the limiter was built for.
    #[error("limiter runs at {expected} Hz but the buffer is {found} Hz")]
    SampleRateMismatch {
        /// Rate the coefficients were derived for
        expected: SampleRate,
        /// Rate of the buffer
        found: SampleRate,
    },
}
assert_error_traits!(LimitError);

/// An input sample whose magnitude exceeds full scale.
///
/// Reported, never fatal: the sample is processed like any other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeWarning {
    /// Frame index within the processed buffer
    pub frame: usize,
    /// Channel of the sample
    pub channel: usize,
    /// The offending value
    pub value: Sample,
}

/// Intermediate sequences of one channel, for inspection and plotting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelTrace {
    /// Envelope after every sample
    pub envelope: Vec<f32>,
    /// Gain needed to hold each envelope value at the threshold
    pub raw_gain: Vec<f32>,
    /// Gain actually applied
    pub gain: Vec<f32>,
}

impl ChannelTrace {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            envelope: Vec::with_capacity(capacity),
            raw_gain: Vec::with_capacity(capacity),
            gain: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, step: &Step) {
        self.envelope.push(step.envelope);
        self.raw_gain.push(step.raw_gain);
        self.gain.push(step.gain);
    }
}

/// Result of limiting a buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct LimiterOutput {
    /// Processed audio, same frame and channel count as the input
    pub buffer: AudioBuffer,
    /// Per-channel traces, present if requested with [`Limiter::with_traces`]
    pub traces: Option<Vec<ChannelTrace>>,
    /// Out-of-range input samples, in frame order
    pub warnings: Vec<RangeWarning>,
}

/// Everything computed for a single sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Envelope after this sample
    pub envelope: f32,
    /// Gain that would hold the envelope at the threshold
    pub raw_gain: f32,
    /// Smoothed gain applied to the sample
    pub gain: f32,
    /// Final output sample
    pub output: Sample,
}

/// The limiter pipeline for a fixed configuration and sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Limiter {
    config: LimiterConfig,
    sample_rate: SampleRate,
    coefficients: Coefficients,
    envelope: EnvelopeFollower,
    smoother: GainSmoother,
    makeup: MakeupAndClip,
    record_traces: bool,
}

impl Limiter {
    /// Validates `config` and derives the coefficients for `sample_rate`.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] describing the first invalid setting.
    pub fn new(config: LimiterConfig, sample_rate: SampleRate) -> Result<Self, ConfigError> {
        let coefficients = config.coefficients(sample_rate)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            threshold = config.threshold,
            attack_coeff = coefficients.attack,
            release_coeff = coefficients.release,
            sample_rate,
            "derived limiter coefficients"
        );

        Ok(Self {
            config,
            sample_rate,
            coefficients,
            envelope: EnvelopeFollower::new(coefficients),
            smoother: GainSmoother::new(coefficients.release),
            makeup: MakeupAndClip::new(config.threshold),
            record_traces: false,
        })
    }

    /// Whether to record envelope and gain traces for every processed buffer.
    pub fn with_traces(mut self, record: bool) -> Self {
        self.record_traces = record;
        self
    }

    /// Settings the limiter was built from.
    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Sample rate the coefficients were derived for.
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// The derived smoothing coefficients.
    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    /// Limits a whole buffer, starting every channel from scratch.
    ///
    /// # Errors
    ///
    /// Fails only if the buffer's sample rate differs from the limiter's.
    pub fn process(&self, input: &AudioBuffer) -> Result<LimiterOutput, LimitError> {
        let mut state = LimiterState::new(input.channels());
        self.process_chunk(input, &mut state)
    }

    /// Limits one chunk of a stream, continuing from and updating `state`.
    ///
    /// Processing a stream chunk by chunk with the same state gives exactly the output of
    /// processing it in one piece. Frame indices in warnings count from the start of the stream,
    /// see [`LimiterState::frames_processed`].
    ///
    /// # Errors
    ///
    /// Fails if the buffer's sample rate differs from the limiter's or `state` tracks a
    /// different number of channels. `state` is untouched on error.
    pub fn process_chunk(
        &self,
        input: &AudioBuffer,
        state: &mut LimiterState,
    ) -> Result<LimiterOutput, LimitError> {
        if input.sample_rate() != self.sample_rate {
            return Err(LimitError::SampleRateMismatch {
                expected: self.sample_rate,
                found: input.sample_rate(),
            });
        }
        if state.channel_count() != input.channels() as usize {
            return Err(LimitError::ChannelMismatch {
                expected: state.channel_count(),
                found: input.channels(),
            });
        }

        let warnings = scan_range_from(input, state.frames_processed());

        #[cfg(feature = "tracing")]
        tracing::trace!(
            frames = input.frame_count(),
            channels = input.channels(),
            "limiting chunk"
        );

        #[cfg(feature = "parallel")]
        let runs: Vec<ChannelRun> = state
            .channels_mut()
            .par_iter_mut()
            .enumerate()
            .map(|(channel, channel_state)| self.run_channel(input, channel, channel_state))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let runs: Vec<ChannelRun> = state
            .channels_mut()
            .iter_mut()
            .enumerate()
            .map(|(channel, channel_state)| self.run_channel(input, channel, channel_state))
            .collect();

        state.advance(input.frame_count());

        let channels = input.channels() as usize;
        let mut buffer = input.clone();
        let mut traces = Vec::with_capacity(if self.record_traces { channels } else { 0 });
        for (channel, run) in runs.into_iter().enumerate() {
            let samples = buffer.samples_mut().iter_mut().skip(channel).step_by(channels);
            for (slot, sample) in samples.zip(run.output) {
                *slot = sample;
            }
            traces.extend(run.trace);
        }

        Ok(LimiterOutput {
            buffer,
            traces: self.record_traces.then_some(traces),
            warnings,
        })
    }

    /// Runs one sample of one channel through every stage.
    ///
    /// An unprimed `state` starts the recurrences from this sample.
    #[inline]
    pub fn process_sample(&self, state: &mut ChannelState, sample: Sample) -> Step {
        let (envelope, raw_gain, gain) = match (state.envelope(), state.gain()) {
            (Some(previous_envelope), Some(previous_gain)) => {
                let envelope = self.envelope.step(previous_envelope, sample);
                let raw_gain = raw_gain(envelope, self.config.threshold);
                (envelope, raw_gain, self.smoother.step(previous_gain, raw_gain))
            }
            _ => {
                let envelope = self.envelope.start(sample);
                let raw_gain = raw_gain(envelope, self.config.threshold);
                (envelope, raw_gain, self.smoother.start(raw_gain))
            }
        };
        state.update(envelope, gain);

        Step {
            envelope,
            raw_gain,
            gain,
            output: self.makeup.apply(sample, gain),
        }
    }

    fn run_channel(
        &self,
        input: &AudioBuffer,
        channel: usize,
        state: &mut ChannelState,
    ) -> ChannelRun {
        let frames = input.frame_count();
        let mut output = Vec::with_capacity(frames);
        let mut trace = self.record_traces.then(|| ChannelTrace::with_capacity(frames));

        for sample in input.channel(channel) {
            let step = self.process_sample(state, sample);
            if let Some(trace) = trace.as_mut() {
                trace.push(&step);
            }
            output.push(step.output);
        }

        ChannelRun { output, trace }
    }
}

struct ChannelRun {
    output: Vec<Sample>,
    trace: Option<ChannelTrace>,
}

/// Limits `input` in one go with a freshly built [`Limiter`].
///
/// # Example
///
/// ```rust
/// use brickwall::{limit, AudioBuffer, LimiterConfig};
///
/// let input = AudioBuffer::mono(44_100, vec![0.1; 64]).unwrap();
/// let output = limit(&input, LimiterConfig::default()).unwrap();
///
/// // makeup gain doubles everything for a 0.5 threshold
/// assert!((output.buffer.samples()[63] - 0.2).abs() < 1e-6);
/// ```
pub fn limit(input: &AudioBuffer, config: LimiterConfig) -> Result<LimiterOutput, LimitError> {
    Limiter::new(config, input.sample_rate())?.process(input)
}

/// Finds every sample outside `[-1.0, 1.0]` and reports it.
///
/// NaN counts as out of range. Frame indices are relative to `input`.
pub fn scan_range(input: &AudioBuffer) -> Vec<RangeWarning> {
    scan_range_from(input, 0)
}

fn scan_range_from(input: &AudioBuffer, first_frame: usize) -> Vec<RangeWarning> {
    let warnings: Vec<RangeWarning> = input
        .frames()
        .enumerate()
        .map(|(frame, samples)| (first_frame + frame, samples))
        .flat_map(|(frame, samples)| {
            samples
                .iter()
                .enumerate()
                .filter(|(_, sample)| !(sample.abs() <= 1.0))
                .map(move |(channel, &value)| RangeWarning {
                    frame,
                    channel,
                    value,
                })
        })
        .collect();

    for warning in &warnings {
        report_out_of_range(warning);
    }
    warnings
}

pub(crate) fn report_out_of_range(warning: &RangeWarning) {
    #[cfg(feature = "tracing")]
    tracing::warn!(
        frame = warning.frame,
        channel = warning.channel,
        value = warning.value,
        "input sample out of range"
    );
    #[cfg(not(feature = "tracing"))]
    eprintln!(
        "input sample out of range: {} at frame {} channel {}",
        warning.value, warning.frame, warning.channel
    );
}
