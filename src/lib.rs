//! Brick-wall limiting of in-memory audio.
//!
//! The limiter holds every channel at or below a threshold, scales the threshold back up to full
//! scale and hard clips whatever overshoot remains, so the output never leaves `[-1.0, 1.0]`.
//!
//! Processing happens in three stages per channel:
//!
//! - An [`EnvelopeFollower`] tracks the signal's magnitude, quickly on rising edges (attack) and
//!   slowly on falling ones (release).
//! - The envelope becomes a [`raw_gain`] that would hold it at the threshold, smoothed by a
//!   [`GainSmoother`] that keeps the gain from collapsing faster than the release time allows.
//! - [`MakeupAndClip`] applies the gain, multiplies by `1 / threshold` and clips.
//!
//! Channels are independent of each other and are processed on a worker pool when the
//! `parallel` feature is enabled.
//!
//! # Usage
//!
//! Limiting a whole buffer:
//!
//! ```rust
//! use brickwall::{AudioBuffer, Limiter, LimiterConfig};
//! use std::time::Duration;
//!
//! let input = AudioBuffer::mono(44_100, vec![0.0, 0.4, 1.0, 0.8, -0.9, 0.1]).unwrap();
//!
//! let config = LimiterConfig::default()
//!     .with_threshold(0.5)
//!     .with_attack(Duration::from_millis(5))
//!     .with_release(Duration::from_millis(50));
//! let limiter = Limiter::new(config, input.sample_rate()).unwrap();
//!
//! let output = limiter.process(&input).unwrap();
//! assert_eq!(output.buffer.frame_count(), input.frame_count());
//! ```
//!
//! Streaming in chunks, carrying the state from one call to the next:
//!
//! ```rust
//! use brickwall::{AudioBuffer, Limiter, LimiterConfig, LimiterState};
//!
//! let limiter = Limiter::new(LimiterConfig::default(), 48_000).unwrap();
//! let mut state = LimiterState::new(2);
//!
//! for _ in 0..4 {
//!     let chunk = AudioBuffer::silence(2, 48_000, 256).unwrap();
//!     let output = limiter.process_chunk(&chunk, &mut state).unwrap();
//!     assert_eq!(output.buffer.frame_count(), 256);
//! }
//! ```
//!
//! Or pulling samples through a [`Source`]:
//!
//! ```rust
//! use brickwall::{AudioBuffer, LimiterConfig, Source};
//!
//! let source = AudioBuffer::mono(44_100, vec![0.2; 32]).unwrap().into_source();
//! let limited: Vec<f32> = source.limit(LimiterConfig::default()).unwrap().collect();
//! assert_eq!(limited.len(), 32);
//! ```
//!
//! # Optional Features
//!
//! - `wav` (default): read and write WAV files through [`wav`].
//! - `tracing` (default): log out-of-range input and derived coefficients with `tracing`. Without
//!   it out-of-range input is reported on stderr.
//! - `parallel` (default): process channels on a `rayon` worker pool.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

mod common;
mod math;

pub mod buffer;
pub mod envelope;
pub mod gain;
pub mod limiter;
pub mod makeup;
pub mod settings;
pub mod source;
pub mod state;
#[cfg(feature = "wav")]
#[cfg_attr(docsrs, doc(cfg(feature = "wav")))]
pub mod wav;

pub use crate::buffer::{AudioBuffer, BufferError, BufferSource};
pub use crate::common::{ChannelCount, Sample, SampleRate};
pub use crate::envelope::{rectify, EnvelopeFollower, Regime};
pub use crate::gain::{raw_gain, GainSmoother, GAIN_EPSILON};
pub use crate::limiter::{
    limit, scan_range, ChannelTrace, LimitError, Limiter, LimiterOutput, RangeWarning, Step,
};
pub use crate::makeup::MakeupAndClip;
pub use crate::math::time_constant_to_coefficient;
pub use crate::settings::{Coefficients, ConfigError, LimiterConfig};
pub use crate::source::{Limit, Source};
pub use crate::state::{ChannelState, LimiterState};
