//! Pull-based streaming through the limiter.
//!
//! A [`Source`] is an iterator of interleaved samples that knows its channel count and sample
//! rate. [`Source::limit`] wraps any source in a [`Limit`] filter that runs every sample through
//! the limiter as it is pulled, carrying the per-channel state along.
//!
//! ```rust
//! use brickwall::{AudioBuffer, LimiterConfig, Source};
//!
//! let input = AudioBuffer::from_frames(44_100, [[0.4, -0.1], [1.2, -0.2], [0.8, -0.3]]).unwrap();
//! let limited = input.into_source().limit(LimiterConfig::default()).unwrap();
//! assert_eq!(limited.channels(), 2);
//!
//! let samples: Vec<f32> = limited.collect();
//! assert_eq!(samples.len(), 6);
//! assert!(samples.iter().all(|s| s.abs() <= 1.0));
//! ```

use crate::buffer::{AudioBuffer, BufferError};
use crate::common::{ChannelCount, Sample, SampleRate};
use crate::limiter::{report_out_of_range, Limiter, RangeWarning};
use crate::settings::{ConfigError, LimiterConfig};
use crate::state::LimiterState;

/// A stream of interleaved samples.
pub trait Source: Iterator<Item = Sample> {
    /// Returns the number of channels. Channels are always interleaved.
    fn channels(&self) -> ChannelCount;

    /// Returns the rate at which the source should be played. In number of samples per second.
    fn sample_rate(&self) -> SampleRate;

    /// Applies brick-wall limiting to the source.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` is invalid for this source's sample rate.
    fn limit(self, config: LimiterConfig) -> Result<Limit<Self>, ConfigError>
    where
        Self: Sized,
    {
        limit(self, config)
    }

    /// Drains the source into an [`AudioBuffer`].
    ///
    /// # Errors
    ///
    /// Fails if the source has no channels, a zero sample rate or ends mid-frame.
    fn collect_buffer(self) -> Result<AudioBuffer, BufferError>
    where
        Self: Sized,
    {
        let channels = self.channels();
        let sample_rate = self.sample_rate();
        AudioBuffer::new(channels, sample_rate, self.collect::<Vec<_>>())
    }
}

/// Creates a limiter that processes the input source.
pub(crate) fn limit<I: Source>(input: I, config: LimiterConfig) -> Result<Limit<I>, ConfigError> {
    let limiter = Limiter::new(config, input.sample_rate())?;
    let state = LimiterState::new(input.channels());
    Ok(Limit {
        input,
        limiter,
        state,
        position: 0,
    })
}

/// A source filter that limits every sample as it is pulled.
///
/// Yields exactly what [`Limiter::process`] would produce for the same samples. Out-of-range
/// input is logged as it streams past, numbered by frame from the start of the stream like
/// [`Limiter::process_chunk`] does.
#[derive(Clone, Debug)]
pub struct Limit<I> {
    input: I,
    limiter: Limiter,
    state: LimiterState,
    position: usize,
}

impl<I> Limit<I>
where
    I: Source,
{
    /// Returns a reference to the inner source.
    #[inline]
    pub fn inner(&self) -> &I {
        &self.input
    }

    /// Returns a mutable reference to the inner source.
    #[inline]
    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Consumes the filter and returns the inner source.
    #[inline]
    pub fn into_inner(self) -> I {
        self.input
    }

    /// The carried per-channel state.
    #[inline]
    pub fn state(&self) -> &LimiterState {
        &self.state
    }

    /// Consumes the filter and returns the carried state, to resume the stream elsewhere.
    pub fn into_state(self) -> LimiterState {
        self.state
    }

    /// Forgets the carried state, as after a seek or a discontinuity in the input.
    pub fn reset(&mut self) {
        self.state.reset();
        self.position = 0;
    }
}

impl<I> Iterator for Limit<I>
where
    I: Source,
{
    type Item = Sample;

    #[inline]
    fn next(&mut self) -> Option<Sample> {
        let sample = self.input.next()?;
        let channel = self.position;
        let frame = self.state.frames_processed();

        // a source without channels has no state to carry
        let state = self.state.channels_mut().get_mut(channel)?;
        let output = self.limiter.process_sample(state, sample).output;

        if !(sample.abs() <= 1.0) {
            report_out_of_range(&RangeWarning {
                frame,
                channel,
                value: sample,
            });
        }

        self.position += 1;
        if self.position == self.state.channel_count() {
            self.position = 0;
            self.state.advance(1);
        }

        Some(output)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.input.size_hint()
    }
}

impl<I> ExactSizeIterator for Limit<I> where I: Source + ExactSizeIterator {}

impl<I> Source for Limit<I>
where
    I: Source,
{
    #[inline]
    fn channels(&self) -> ChannelCount {
        self.input.channels()
    }

    #[inline]
    fn sample_rate(&self) -> SampleRate {
        self.input.sample_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn matches_batch_processing() {
        let data: Vec<f32> = (0..2_000)
            .map(|i| (i as f32 * 0.01).sin() * if i % 2 == 0 { 1.5 } else { 0.3 })
            .collect();
        let input = AudioBuffer::new(2, 44_100, data).unwrap();
        let config = LimiterConfig::default().with_release(Duration::from_millis(20));

        let batch = Limiter::new(config, 44_100).unwrap().process(&input).unwrap();
        let streamed: Vec<f32> = input.into_source().limit(config).unwrap().collect();

        assert_eq!(batch.buffer.samples(), &streamed[..]);
    }

    #[test]
    fn rejects_invalid_config() {
        let source = AudioBuffer::mono(44_100, vec![0.0]).unwrap().into_source();
        assert!(matches!(
            source.limit(LimiterConfig::default().with_threshold(-1.0)),
            Err(ConfigError::NonPositiveThreshold(_))
        ));
    }

    #[test]
    fn reset_unprimes_state() {
        let source = AudioBuffer::mono(44_100, vec![0.3; 8]).unwrap().into_source();
        let mut limited = source.limit(LimiterConfig::default()).unwrap();
        assert_eq!(limited.by_ref().take(4).count(), 4);
        assert!(limited.state().channels()[0].is_primed());

        limited.reset();
        assert!(!limited.state().channels()[0].is_primed());
        assert_eq!(limited.inner().len(), 4);
    }

    #[test]
    fn collects_back_into_a_buffer() {
        let input = AudioBuffer::from_frames(8_000, [[0.1, 0.2], [0.3, 0.4]]).unwrap();
        let output = input
            .clone()
            .into_source()
            .limit(LimiterConfig::default().with_threshold(1.0))
            .unwrap()
            .collect_buffer()
            .unwrap();
        assert_eq!(output.channels(), 2);
        assert_eq!(output.sample_rate(), 8_000);
        assert_eq!(output.frame_count(), 2);
    }
}
