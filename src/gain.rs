//! Gain computation and release-limited gain smoothing.
//!
//! The raw gain is the factor that would bring the current envelope down to the threshold. It
//! never boosts: quiet signals get a gain of exactly `1.0`.
//!
//! The smoothed gain never sits below the raw gain, and from one sample to the next it cannot
//! shrink by more than the release coefficient:
//!
//! ```text
//! gain[0] = raw_gain[0]
//! gain[n] = max(raw_gain[n], gain[n-1] * release)
//! ```
//!
//! Recovery towards unity is paced by the envelope, whose falling edge uses the release time.

/// Added to the envelope before dividing so silence yields unity gain instead of a division by
/// zero.
pub const GAIN_EPSILON: f32 = 1e-9;

/// Gain that keeps an envelope at or below `threshold`, in `(0, 1]`.
///
/// Never drops below `f32::MIN_POSITIVE`, even for a saturated envelope, so a gain held down by
/// an enormous peak can still recover.
#[must_use]
#[inline]
pub fn raw_gain(envelope: f32, threshold: f32) -> f32 {
    f32::min(1.0, threshold / (envelope + GAIN_EPSILON)).max(f32::MIN_POSITIVE)
}

/// Smooths raw gain with a release-rate floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainSmoother {
    release: f32,
}

impl GainSmoother {
    /// Creates a smoother whose gain may shrink by at most `release` per sample.
    pub fn new(release: f32) -> Self {
        Self { release }
    }

    /// Gain of the first sample of a run.
    #[inline]
    pub fn start(&self, raw_gain: f32) -> f32 {
        raw_gain
    }

    /// Advances the smoothed gain by one sample.
    #[inline]
    pub fn step(&self, previous: f32, raw_gain: f32) -> f32 {
        f32::max(raw_gain, previous * self.release)
    }
}
