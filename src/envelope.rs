//! Envelope detection with asymmetric attack/release smoothing.
//!
//! The follower is a one-pole exponential filter over the rectified signal. Which time constant
//! applies is decided fresh for every sample: while the rectified input is above the previous
//! envelope the filter is [`Regime::Attacking`], otherwise it is [`Regime::Releasing`].
//!
//! ```text
//! env[0] = |x[0]|
//! env[n] = a * env[n-1] + (1 - a) * |x[n]|    a = attack if |x[n]| > env[n-1], else release
//! ```
//!
//! Each channel is followed on its own; there is no linking between channels.
//!
//! Non-finite input never reaches the recurrence: NaN rectifies to `0.0` and infinities to
//! `f32::MAX`, so one bad sample cannot stall the envelope for the rest of a stream.

use crate::common::Sample;
use crate::settings::Coefficients;

/// Which time constant the follower applies to a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Rectified input above the previous envelope
    Attacking,
    /// Rectified input at or below the previous envelope
    Releasing,
}

impl Regime {
    /// Selects the regime for a rectified sample given the previous envelope.
    #[inline]
    pub fn select(previous: f32, rectified: f32) -> Regime {
        if rectified > previous {
            Regime::Attacking
        } else {
            Regime::Releasing
        }
    }
}

/// Tracks a smoothed estimate of a channel's magnitude.
///
/// The follower only holds coefficients; the envelope itself lives in the caller's
/// [`ChannelState`](crate::ChannelState) so it can be carried across chunks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeFollower {
    attack: f32,
    release: f32,
}

impl EnvelopeFollower {
    /// Creates a follower from validated coefficients.
    pub fn new(coefficients: Coefficients) -> Self {
        Self {
            attack: coefficients.attack,
            release: coefficients.release,
        }
    }

    /// Envelope of the first sample of a run: its magnitude.
    #[inline]
    pub fn start(&self, sample: Sample) -> f32 {
        rectify(sample)
    }

    /// Advances the envelope by one sample.
    #[inline]
    pub fn step(&self, previous: f32, sample: Sample) -> f32 {
        let rectified = rectify(sample);
        let coefficient = match Regime::select(previous, rectified) {
            Regime::Attacking => self.attack,
            Regime::Releasing => self.release,
        };
        // rounding near f32::MAX can carry the sum past it
        f32::min(coefficient * previous + (1.0 - coefficient) * rectified, f32::MAX)
    }

    /// Computes the whole envelope of a channel, starting a fresh run.
    pub fn follow(&self, samples: &[Sample]) -> Vec<f32> {
        let mut envelope = Vec::with_capacity(samples.len());
        let mut iter = samples.iter();
        if let Some(&first) = iter.next() {
            let mut current = self.start(first);
            envelope.push(current);
            for &sample in iter {
                current = self.step(current, sample);
                envelope.push(current);
            }
        }
        envelope
    }
}

/// Magnitude of a sample, finite even for non-finite input.
#[inline]
pub fn rectify(sample: Sample) -> f32 {
    let magnitude = sample.abs();
    if magnitude.is_nan() {
        0.0
    } else {
        magnitude.min(f32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn follower() -> EnvelopeFollower {
        EnvelopeFollower::new(Coefficients {
            attack: 0.5,
            release: 0.9,
        })
    }

    #[test]
    fn starts_at_first_magnitude() {
        assert_eq!(follower().start(-0.75), 0.75);
        assert_eq!(follower().follow(&[-0.75])[0], 0.75);
        assert!(follower().follow(&[]).is_empty());
    }

    #[test]
    fn rising_uses_attack() {
        let env = follower().step(0.0, 1.0);
        assert_abs_diff_eq!(env, 0.5);
        assert_eq!(Regime::select(0.0, 1.0), Regime::Attacking);
    }

    #[test]
    fn falling_uses_release() {
        let env = follower().step(1.0, 0.0);
        assert_abs_diff_eq!(env, 0.9);
        assert_eq!(Regime::select(1.0, 0.0), Regime::Releasing);
    }

    #[test]
    fn equal_magnitude_releases() {
        assert_eq!(Regime::select(0.5, 0.5), Regime::Releasing);
        assert_abs_diff_eq!(follower().step(0.5, -0.5), 0.5);
    }

    #[test]
    fn rectifies_negative_samples() {
        let positive = follower().follow(&[0.0, 0.8, 0.1, 0.6]);
        let negative = follower().follow(&[0.0, -0.8, -0.1, -0.6]);
        assert_eq!(positive, negative);
    }

    #[test]
    fn non_finite_samples_rectify_to_finite_magnitudes() {
        assert_eq!(rectify(f32::NAN), 0.0);
        assert_eq!(rectify(f32::INFINITY), f32::MAX);
        assert_eq!(rectify(f32::NEG_INFINITY), f32::MAX);
        assert_eq!(rectify(-0.25), 0.25);
    }

    #[test]
    fn nan_does_not_stick_in_the_envelope() {
        let env = follower().follow(&[0.8, f32::NAN, 0.8, 0.8]);
        assert!(env.iter().all(|e| e.is_finite()));
        assert_abs_diff_eq!(env[1], 0.72, epsilon = 1e-6);
        assert!(env[3] > env[2]);
    }

    #[test]
    fn infinity_saturates_at_max() {
        let env = follower().follow(&[f32::INFINITY, f32::INFINITY, 0.0]);
        assert_eq!(env[0], f32::MAX);
        assert!(env[1].is_finite() && env[1] >= 0.99 * f32::MAX);
        assert!(env[2].is_finite());
        assert!(env[2] < f32::MAX);
    }

    #[test]
    fn converges_geometrically_towards_constant_input() {
        // distance to the target shrinks by the attack coefficient every sample
        let env = follower().follow(&[0.0, 1.0, 1.0, 1.0, 1.0]);
        let expected = [0.0, 0.5, 0.75, 0.875, 0.9375];
        for (got, want) in env.iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-6);
        }
    }

    #[test]
    fn decays_with_release_coefficient() {
        let env = follower().follow(&[1.0, 0.0, 0.0, 0.0]);
        let expected = [1.0, 0.9, 0.81, 0.729];
        for (got, want) in env.iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-6);
        }
    }
}
