//! In-memory audio made of interleaved frames.
//!
//! An [`AudioBuffer`] is an ordered sequence of frames, each holding one sample per channel, plus
//! the sample rate. Single channel input is just a buffer with one channel, so every stage of the
//! limiter sees the same frame layout.
//!
//! # Example
//!
//! ```
//! use brickwall::AudioBuffer;
//!
//! let stereo = AudioBuffer::from_frames(44_100, [[0.1, -0.1], [0.2, -0.2]]).unwrap();
//! assert_eq!(stereo.channels(), 2);
//! assert_eq!(stereo.frame_count(), 2);
//! assert_eq!(stereo.frame(1), Some(&[0.2, -0.2][..]));
//! ```

use std::time::Duration;

use crate::common::{assert_error_traits, ChannelCount, Sample, SampleRate};
use crate::source::Source;

/// Error building an [`AudioBuffer`].
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A buffer needs at least one channel.
    #[error("audio must have at least one channel")]
    ZeroChannels,
    /// A buffer needs a positive sample rate.
    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,
    /// The sample count is not a whole number of frames.
    #[error("{samples} samples do not divide into frames of {channels} channels")]
    PartialFrame {
        /// Number of samples given
        samples: usize,
        /// Channel count they were meant to fill
        channels: ChannelCount,
    },
}
assert_error_traits!(BufferError);

/// Interleaved frames of normalized samples with an associated sample rate.
///
/// Samples are not required to lie within `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    data: Vec<Sample>,
    channels: ChannelCount,
    sample_rate: SampleRate,
}

impl AudioBuffer {
    /// Builds a buffer from interleaved samples.
    ///
    /// # Errors
    ///
    /// - if the number of channels is zero.
    /// - if the sample rate is zero.
    /// - if the length of `data` is not a multiple of `channels`.
    pub fn new<D>(
        channels: ChannelCount,
        sample_rate: SampleRate,
        data: D,
    ) -> Result<AudioBuffer, BufferError>
    where
        D: Into<Vec<Sample>>,
    {
        if channels == 0 {
            return Err(BufferError::ZeroChannels);
        }
        if sample_rate == 0 {
            return Err(BufferError::ZeroSampleRate);
        }

        let data = data.into();
        if data.len() % channels as usize != 0 {
            return Err(BufferError::PartialFrame {
                samples: data.len(),
                channels,
            });
        }

        Ok(AudioBuffer {
            data,
            channels,
            sample_rate,
        })
    }

    /// Builds a single channel buffer, one frame per sample.
    pub fn mono<D>(sample_rate: SampleRate, data: D) -> Result<AudioBuffer, BufferError>
    where
        D: Into<Vec<Sample>>,
    {
        Self::new(1, sample_rate, data)
    }

    /// Builds a buffer from fixed-size frames.
    pub fn from_frames<const N: usize>(
        sample_rate: SampleRate,
        frames: impl IntoIterator<Item = [Sample; N]>,
    ) -> Result<AudioBuffer, BufferError> {
        let channels = ChannelCount::try_from(N).map_err(|_| BufferError::PartialFrame {
            samples: N,
            channels: ChannelCount::MAX,
        })?;
        let data: Vec<Sample> = frames.into_iter().flatten().collect();
        Self::new(channels, sample_rate, data)
    }

    /// Builds a buffer of `frames` silent frames.
    pub fn silence(
        channels: ChannelCount,
        sample_rate: SampleRate,
        frames: usize,
    ) -> Result<AudioBuffer, BufferError> {
        Self::new(
            channels,
            sample_rate,
            vec![0.0; frames * channels as usize],
        )
    }

    /// Number of channels in every frame.
    #[inline]
    pub fn channels(&self) -> ChannelCount {
        self.channels
    }

    /// Sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Number of frames, the length of every channel.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.data.len() / self.channels as usize
    }

    /// Whether the buffer holds no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Playback length of the buffer.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    /// All samples, interleaved.
    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.data
    }

    /// All samples, interleaved and mutable.
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.data
    }

    /// The frame at `index`, one sample per channel.
    pub fn frame(&self, index: usize) -> Option<&[Sample]> {
        let channels = self.channels as usize;
        self.data.get(index * channels..(index + 1) * channels)
    }

    /// Iterates over frames in order.
    pub fn frames(&self) -> std::slice::ChunksExact<'_, Sample> {
        self.data.chunks_exact(self.channels as usize)
    }

    /// Iterates over the samples of one channel.
    ///
    /// Yields nothing if `channel` is out of range.
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = Sample> + '_ {
        let channels = self.channels as usize;
        let skip = if channel < channels {
            channel
        } else {
            self.data.len()
        };
        self.data.iter().skip(skip).step_by(channels).copied()
    }

    /// Consumes the buffer and returns the interleaved samples.
    pub fn into_samples(self) -> Vec<Sample> {
        self.data
    }

    /// Turns the buffer into a [`Source`] yielding its interleaved samples.
    pub fn into_source(self) -> BufferSource {
        BufferSource {
            data: self.data.into_iter(),
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }
}

/// A buffer of samples treated as a source.
#[derive(Debug, Clone)]
pub struct BufferSource {
    data: std::vec::IntoIter<Sample>,
    channels: ChannelCount,
    sample_rate: SampleRate,
}

impl Iterator for BufferSource {
    type Item = Sample;

    #[inline]
    fn next(&mut self) -> Option<Sample> {
        self.data.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.data.size_hint()
    }
}

impl ExactSizeIterator for BufferSource {}

impl Source for BufferSource {
    #[inline]
    fn channels(&self) -> ChannelCount {
        self.channels
    }

    #[inline]
    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }
}
