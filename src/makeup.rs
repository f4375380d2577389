//! Makeup gain and the final hard clip.

use crate::common::Sample;

/// Applies gain, fixed makeup gain and a hard clip to full scale.
///
/// Makeup is `1 / threshold` and is applied to every sample, whether or not it was gain reduced.
/// A signal held at the threshold comes out at full scale, and passages below the threshold come
/// out louder by the same factor.
///
/// The clip catches overshoot that slips past the finite attack time, so output never leaves
/// `[-1.0, 1.0]`. NaN input comes out as silence and infinities are clipped like any other
/// overshoot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MakeupAndClip {
    makeup: f32,
}

impl MakeupAndClip {
    /// Creates the stage for a validated, positive threshold.
    pub fn new(threshold: f32) -> Self {
        Self {
            makeup: 1.0 / threshold,
        }
    }

    /// The fixed makeup factor.
    #[inline]
    pub fn makeup(&self) -> f32 {
        self.makeup
    }

    /// Produces the final sample from an input sample and its smoothed gain.
    #[inline]
    pub fn apply(&self, sample: Sample, gain: f32) -> Sample {
        let reduced = sample * gain;
        let scaled = reduced * self.makeup;
        if scaled.is_nan() {
            return 0.0;
        }
        scaled.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn threshold_maps_to_full_scale() {
        let stage = MakeupAndClip::new(0.5);
        assert_abs_diff_eq!(stage.apply(0.5, 1.0), 1.0);
        assert_abs_diff_eq!(stage.apply(-1.0, 0.5), -1.0);
    }

    #[test]
    fn quiet_signal_is_amplified() {
        let stage = MakeupAndClip::new(0.5);
        assert_abs_diff_eq!(stage.apply(0.2, 1.0), 0.4);
        assert_abs_diff_eq!(stage.makeup(), 2.0);
    }

    #[test]
    fn overshoot_is_clipped() {
        let stage = MakeupAndClip::new(0.25);
        assert_eq!(stage.apply(0.9, 1.0), 1.0);
        assert_eq!(stage.apply(-3.0, 0.5), -1.0);
    }

    #[test]
    fn non_finite_input_comes_out_finite() {
        let stage = MakeupAndClip::new(0.5);
        assert_eq!(stage.apply(f32::NAN, 1.0), 0.0);
        assert_eq!(stage.apply(f32::INFINITY, f32::MIN_POSITIVE), 1.0);
        assert_eq!(stage.apply(f32::NEG_INFINITY, 0.5), -1.0);
    }

    #[test]
    fn silence_stays_silent() {
        assert_eq!(MakeupAndClip::new(0.01).apply(0.0, 1.0), 0.0);
    }
}
