//! Limiter configuration and the coefficients derived from it.
//!
//! # Parameters
//!
//! * **Threshold** - Linear ceiling the limiter holds the signal at before makeup gain
//! * **Attack** - Time for the envelope to follow rising magnitude
//! * **Release** - Time for the envelope to follow falling magnitude, and for gain to recover
//!
//! ```rust
//! use brickwall::LimiterConfig;
//! use std::time::Duration;
//!
//! let config = LimiterConfig::new()
//!     .with_threshold(0.25)                     // hold peaks at a quarter of full scale
//!     .with_attack(Duration::from_millis(2))    // fast 2ms attack
//!     .with_release(Duration::from_millis(80)); // 80ms release
//!
//! let coefficients = config.coefficients(48_000).unwrap();
//! assert!(coefficients.attack < coefficients.release);
//! ```

use std::time::Duration;

use crate::common::{assert_error_traits, SampleRate};
use crate::math::time_constant_to_coefficient;

/// Error rejecting a configuration before any sample is processed.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The threshold is zero, negative or not a finite number.
    #[error("threshold must be a positive finite level, got {0}")]
    NonPositiveThreshold(f32),
    /// The threshold is so small that the makeup gain `1 / threshold` overflows.
    #[error("threshold {0} is too small for a finite makeup gain")]
    ThresholdTooSmall(f32),
    /// The attack time constant is zero.
    #[error("attack time must be greater than zero")]
    ZeroAttack,
    /// The release time constant is zero.
    #[error("release time must be greater than zero")]
    ZeroRelease,
    /// A time constant given in milliseconds is negative or not a finite number.
    #[error("{name} time must be a positive number of milliseconds, got {millis}")]
    NegativeTime {
        /// Which time constant was rejected
        name: &'static str,
        /// The rejected value
        millis: f32,
    },
    /// The sample rate is zero.
    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,
    /// A time constant is so short or so long that its coefficient rounds to 0 or 1.
    #[error("{name} time of {time:?} at {sample_rate} Hz gives a degenerate coefficient {coefficient}")]
    DegenerateCoefficient {
        /// Which time constant was rejected
        name: &'static str,
        /// The rejected time constant
        time: Duration,
        /// Sample rate the coefficient was derived for
        sample_rate: SampleRate,
        /// The coefficient that fell outside `(0, 1)`
        coefficient: f32,
    },
}
assert_error_traits!(ConfigError);

/// Configuration settings for the brick-wall limiter.
///
/// Defaults are a 0.5 threshold, 5 ms attack and 50 ms release.
///
/// Note that makeup gain is fixed at `1 / threshold` and applies to the whole signal, so a lower
/// threshold also makes quiet passages louder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimiterConfig {
    /// Linear level the signal is held at or below before makeup, in `(0, 1]`
    pub threshold: f32,
    /// Time to respond to level increases
    pub attack: Duration,
    /// Time to recover after level decreases
    pub release: Duration,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            attack: Duration::from_millis(5),
            release: Duration::from_millis(50),
        }
    }
}

impl LimiterConfig {
    /// Creates new settings with default values.
    ///
    /// Equivalent to [`LimiterConfig::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds settings from raw millisecond values.
    ///
    /// Negative, NaN or infinite times are rejected here since they cannot become a
    /// [`Duration`]. The remaining checks happen in [`LimiterConfig::coefficients`].
    pub fn from_millis(threshold: f32, attack_ms: f32, release_ms: f32) -> Result<Self, ConfigError> {
        Ok(Self {
            threshold,
            attack: millis_to_duration("attack", attack_ms)?,
            release: millis_to_duration("release", release_ms)?,
        })
    }

    /// Sets the threshold level.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Linear level, e.g. `0.5` holds peaks near half scale before makeup
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the attack time - how quickly the envelope responds to level increases.
    ///
    /// # Arguments
    ///
    /// * `attack` - Time constant of the rising envelope
    ///   - Shorter (1-5 ms) = faster response, less overshoot reaching the clipper
    ///   - Longer (10-20 ms) = smoother sound, more peaks end up hard clipped
    pub fn with_attack(mut self, attack: Duration) -> Self {
        self.attack = attack;
        self
    }

    /// Sets the release time - how quickly the envelope decays and the gain recovers.
    ///
    /// # Arguments
    ///
    /// * `release` - Time constant of the falling envelope and of gain recovery
    ///   - Shorter (10-50 ms) = quick recovery, may sound pumping
    ///   - Longer (100-500 ms) = smooth recovery, more natural sound
    pub fn with_release(mut self, release: Duration) -> Self {
        self.release = release;
        self
    }

    /// Checks the settings and derives the smoothing coefficients for `sample_rate`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the threshold is not positive or too small to invert, if
    /// either time constant or the sample rate is zero, or if a coefficient would not lie
    /// strictly inside `(0, 1)`.
    pub fn coefficients(&self, sample_rate: SampleRate) -> Result<Coefficients, ConfigError> {
        if !(self.threshold > 0.0 && self.threshold.is_finite()) {
            return Err(ConfigError::NonPositiveThreshold(self.threshold));
        }
        if !(1.0 / self.threshold).is_finite() {
            return Err(ConfigError::ThresholdTooSmall(self.threshold));
        }
        if self.attack.is_zero() {
            return Err(ConfigError::ZeroAttack);
        }
        if self.release.is_zero() {
            return Err(ConfigError::ZeroRelease);
        }
        if sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }

        Ok(Coefficients {
            attack: checked_coefficient("attack", self.attack, sample_rate)?,
            release: checked_coefficient("release", self.release, sample_rate)?,
        })
    }
}

/// Per-sample smoothing coefficients, both strictly inside `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Weight of the previous envelope while the signal rises
    pub attack: f32,
    /// Weight of the previous envelope while the signal falls, and the per-sample gain
    /// recovery factor
    pub release: f32,
}

fn millis_to_duration(name: &'static str, millis: f32) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(f64::from(millis) / 1000.0)
        .map_err(|_| ConfigError::NegativeTime { name, millis })
}

fn checked_coefficient(
    name: &'static str,
    time: Duration,
    sample_rate: SampleRate,
) -> Result<f32, ConfigError> {
    let coefficient = time_constant_to_coefficient(time, sample_rate);
    if coefficient > 0.0 && coefficient < 1.0 {
        Ok(coefficient)
    } else {
        Err(ConfigError::DegenerateCoefficient {
            name,
            time,
            sample_rate,
            coefficient,
        })
    }
}
