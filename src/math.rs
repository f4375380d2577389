use std::time::Duration;

use crate::common::SampleRate;

/// Converts a time constant to a smoothing coefficient for one-pole exponential filtering.
///
/// The coefficient is `e^(-1 / (seconds * sample_rate))`:
/// * Longer times = coefficients closer to 1.0 = slower, smoother response
/// * Shorter times = coefficients closer to 0.0 = faster, more immediate response
///
/// Computed in double precision and rounded once, so long time constants at high sample rates
/// keep their distance from 1.0.
///
/// A zero time constant or sample rate yields `0.0`; callers validate first (see
/// [`LimiterConfig::coefficients`](crate::LimiterConfig::coefficients)).
#[must_use]
#[inline]
pub fn time_constant_to_coefficient(time_constant: Duration, sample_rate: SampleRate) -> f32 {
    f64::exp(-1.0 / (time_constant.as_secs_f64() * sample_rate as f64)) as f32
}
