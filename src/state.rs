//! Loop-carried limiter state.
//!
//! Every channel carries its own envelope and smoothed gain from one sample to the next. Keeping
//! that state outside the limiter lets a stream be processed in chunks: hand the same
//! [`LimiterState`] to each call and the output is identical to processing the stream at once.

use crate::common::ChannelCount;

/// Envelope and smoothed gain of one channel.
///
/// A fresh state is unprimed; the first sample it sees starts the recurrences.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelState {
    tracking: Option<Tracking>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tracking {
    envelope: f32,
    gain: f32,
}

impl ChannelState {
    /// Creates an unprimed state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a sample has been processed since creation or the last reset.
    #[inline]
    pub fn is_primed(&self) -> bool {
        self.tracking.is_some()
    }

    /// Current envelope, if primed.
    #[inline]
    pub fn envelope(&self) -> Option<f32> {
        self.tracking.map(|t| t.envelope)
    }

    /// Current smoothed gain, if primed.
    #[inline]
    pub fn gain(&self) -> Option<f32> {
        self.tracking.map(|t| t.gain)
    }

    /// Forgets the carried envelope and gain.
    pub fn reset(&mut self) {
        self.tracking = None;
    }

    #[inline]
    pub(crate) fn update(&mut self, envelope: f32, gain: f32) {
        self.tracking = Some(Tracking { envelope, gain });
    }
}

/// Per-channel state for a whole stream, plus how far into the stream it is.
#[derive(Debug, Clone, PartialEq)]
pub struct LimiterState {
    channels: Vec<ChannelState>,
    frames: usize,
}

impl LimiterState {
    /// Creates unprimed state for `channels` channels.
    pub fn new(channels: ChannelCount) -> Self {
        Self {
            channels: vec![ChannelState::new(); channels as usize],
            frames: 0,
        }
    }

    /// Number of channels tracked.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// State of one channel.
    pub fn channel(&self, channel: usize) -> Option<&ChannelState> {
        self.channels.get(channel)
    }

    /// State of every channel, in channel order.
    pub fn channels(&self) -> &[ChannelState] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [ChannelState] {
        &mut self.channels
    }

    /// Frames processed since creation or the last reset.
    ///
    /// Warnings from later chunks are numbered from here on.
    pub fn frames_processed(&self) -> usize {
        self.frames
    }

    pub(crate) fn advance(&mut self, frames: usize) {
        self.frames += frames;
    }

    /// Returns every channel to the unprimed state and the stream position to zero.
    pub fn reset(&mut self) {
        self.channels.fill(ChannelState::new());
        self.frames = 0;
    }
}
