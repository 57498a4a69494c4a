//! Configuration for loop analysis and phasor animation.
//!
//! [`AnalyzerConfig`] centralizes the parameters of the resample → spectrum →
//! phasor-set pipeline, [`AnimationConfig`] those of the reconstruction engine.
//!
//! # Example
//!
//! ```
//! use phasor_loop::{AnalyzerConfig, SortPolicy};
//!
//! let config = AnalyzerConfig::default()
//!     .with_sample_density(4.0)
//!     .with_frequency_window(-10, 10)
//!     .with_limit_count(Some(12))
//!     .with_sort_policy(SortPolicy::ByDescendingMagnitude);
//! assert!(config.validate().is_ok());
//! ```

use std::cmp::Ordering;

use crate::error::{FourierError, Result};
use crate::phasor::Phasor;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Length of one animation period in milliseconds.
///
/// Frequencies are cycles per period, so a phasor of frequency `k` completes
/// `k` turns during this interval.
pub const PERIOD_MS: f64 = 1000.0;

/// Parameters of the analysis pipeline.
///
/// # Core Parameters
///
/// - `sample_density`: samples per unit of arc length when resampling.
/// - `spectrum_min`/`spectrum_max`: frequency range the spectrum is built for.
/// - `lower_frequency`/`upper_frequency`: window of non-zero frequencies that
///   enter the phasor set. Must lie inside the spectrum range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalyzerConfig {
    /// Samples per unit of arc length.
    /// - 1.0: coarse, used by the circle game
    /// - 2.0: default for hand-drawn loops in pixel coordinates
    pub sample_density: f64,

    /// Lowest frequency the spectrum is computed for.
    pub spectrum_min: i32,

    /// Highest frequency the spectrum is computed for.
    pub spectrum_max: i32,

    /// Lowest non-zero frequency taking part in the reconstruction.
    pub lower_frequency: i32,

    /// Highest non-zero frequency taking part in the reconstruction.
    pub upper_frequency: i32,

    /// Keep only the N largest-magnitude non-DC phasors.
    pub limit_count: Option<usize>,

    /// Iteration order of the phasor arms.
    pub sort_policy: SortPolicy,

    /// How spectrum coefficients are evaluated.
    pub spectral_method: SpectralMethod,
}

/// Display order of the phasor arms.
///
/// The order never changes the reconstructed sum, only how the arms are
/// chained when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SortPolicy {
    /// Insertion order: DC first, then ascending frequency.
    #[default]
    None,
    /// Largest arm first.
    ByDescendingMagnitude,
    /// Slowest rotating arm first.
    ByAscendingAbsFrequency,
}

impl SortPolicy {
    /// Map a selector index to a policy.
    ///
    /// `0` is descending magnitude, `1` ascending absolute frequency, anything
    /// else leaves the phasors unordered.
    #[must_use]
    pub const fn from_index(index: i32) -> Self {
        match index {
            0 => Self::ByDescendingMagnitude,
            1 => Self::ByAscendingAbsFrequency,
            _ => Self::None,
        }
    }

    /// Comparison function for this policy, `None` if the order is left as is.
    #[must_use]
    pub fn comparator(self) -> Option<fn(&Phasor, &Phasor) -> Ordering> {
        match self {
            Self::None => None,
            Self::ByDescendingMagnitude => Some(by_descending_magnitude),
            Self::ByAscendingAbsFrequency => Some(by_ascending_abs_frequency),
        }
    }
}

fn by_descending_magnitude(a: &Phasor, b: &Phasor) -> Ordering {
    b.magnitude.total_cmp(&a.magnitude)
}

fn by_ascending_abs_frequency(a: &Phasor, b: &Phasor) -> Ordering {
    a.frequency.unsigned_abs().cmp(&b.frequency.unsigned_abs())
}

/// Evaluation strategy for spectrum coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpectralMethod {
    /// Direct Riemann sum per frequency, O(K·N).
    #[default]
    Direct,
    /// One forward FFT of the whole signal, coefficients folded by `k mod N`.
    Fft,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_density: 2.0,
            spectrum_min: -100,
            spectrum_max: 100,
            lower_frequency: -20,
            upper_frequency: 20,
            limit_count: None,
            sort_policy: SortPolicy::None,
            spectral_method: SpectralMethod::Direct,
        }
    }
}

impl AnalyzerConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] if any parameter is out of
    /// its valid range.
    pub fn validate(&self) -> Result<()> {
        validate_sample_density(self.sample_density)?;
        if self.spectrum_min > self.spectrum_max {
            return Err(FourierError::invalid_parameter(format!(
                "spectrum range [{}, {}] is empty",
                self.spectrum_min, self.spectrum_max
            )));
        }
        if self.spectrum_min > 0 || self.spectrum_max < 0 {
            return Err(FourierError::invalid_parameter(
                "spectrum range must contain frequency 0",
            ));
        }
        self.validate_window(self.lower_frequency, self.upper_frequency)
    }

    /// Check that a frequency window lies inside the analysed range.
    ///
    /// An inverted window (`lower > upper`) is allowed and selects no
    /// non-zero frequency.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] if either bound falls
    /// outside `[spectrum_min, spectrum_max]`.
    pub fn validate_window(&self, lower: i32, upper: i32) -> Result<()> {
        let range = self.spectrum_min..=self.spectrum_max;
        if lower <= upper && (!range.contains(&lower) || !range.contains(&upper)) {
            return Err(FourierError::invalid_parameter(format!(
                "frequency window [{lower}, {upper}] exceeds analysed range [{}, {}]",
                self.spectrum_min, self.spectrum_max
            )));
        }
        Ok(())
    }

    /// Preset used by the circle drawing game.
    #[must_use]
    pub fn circle_game() -> Self {
        Self {
            sample_density: 1.0,
            spectrum_min: -100,
            spectrum_max: 100,
            ..Self::default()
        }
    }

    /// Set the sample density.
    #[must_use]
    pub const fn with_sample_density(mut self, density: f64) -> Self {
        self.sample_density = density;
        self
    }

    /// Set the analysed spectrum range.
    #[must_use]
    pub const fn with_spectrum_range(mut self, min: i32, max: i32) -> Self {
        self.spectrum_min = min;
        self.spectrum_max = max;
        self
    }

    /// Set the frequency window of the phasor set.
    #[must_use]
    pub const fn with_frequency_window(mut self, lower: i32, upper: i32) -> Self {
        self.lower_frequency = lower;
        self.upper_frequency = upper;
        self
    }

    /// Set the phasor limit.
    #[must_use]
    pub const fn with_limit_count(mut self, limit: Option<usize>) -> Self {
        self.limit_count = limit;
        self
    }

    /// Set the phasor ordering.
    #[must_use]
    pub const fn with_sort_policy(mut self, policy: SortPolicy) -> Self {
        self.sort_policy = policy;
        self
    }

    /// Set the spectral evaluation method.
    #[must_use]
    pub const fn with_spectral_method(mut self, method: SpectralMethod) -> Self {
        self.spectral_method = method;
        self
    }
}

/// Parameters of the reconstruction engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnimationConfig {
    /// Trail sampling granularity in simulated milliseconds.
    pub step_size_ms: u32,

    /// Playback speed multiplier applied to wall-clock time.
    pub time_factor: f64,

    /// Start point within the period, in milliseconds.
    pub time_offset_ms: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            step_size_ms: 10,
            time_factor: 0.1,
            time_offset_ms: 0,
        }
    }
}

impl AnimationConfig {
    /// Smallest step the stepper control allows.
    pub const MIN_STEP_SIZE_MS: u32 = 1;

    /// Largest step the stepper control allows.
    pub const MAX_STEP_SIZE_MS: u32 = 16;

    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] if any parameter is out of
    /// its valid range.
    pub fn validate(&self) -> Result<()> {
        validate_step_size(self.step_size_ms)?;
        validate_time_factor(self.time_factor)?;
        validate_time_offset(self.time_offset_ms)
    }

    /// Set the trail step size.
    #[must_use]
    pub const fn with_step_size(mut self, step_ms: u32) -> Self {
        self.step_size_ms = step_ms;
        self
    }

    /// Set the playback speed.
    #[must_use]
    pub const fn with_time_factor(mut self, factor: f64) -> Self {
        self.time_factor = factor;
        self
    }

    /// Set the start offset.
    #[must_use]
    pub const fn with_time_offset(mut self, offset_ms: u32) -> Self {
        self.time_offset_ms = offset_ms;
        self
    }
}

pub(crate) fn validate_sample_density(density: f64) -> Result<()> {
    if !density.is_finite() || density <= 0.0 {
        return Err(FourierError::invalid_parameter(format!(
            "sample density must be positive, got {density}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_step_size(step_ms: u32) -> Result<()> {
    if step_ms < AnimationConfig::MIN_STEP_SIZE_MS {
        return Err(FourierError::invalid_parameter(
            "simulation step size must be at least 1 ms",
        ));
    }
    Ok(())
}

pub(crate) fn validate_time_factor(factor: f64) -> Result<()> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(FourierError::invalid_parameter(format!(
            "time factor must be finite and non-negative, got {factor}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_time_offset(offset_ms: u32) -> Result<()> {
    if f64::from(offset_ms) >= PERIOD_MS {
        return Err(FourierError::invalid_parameter(format!(
            "time offset must be below one period, got {offset_ms} ms"
        )));
    }
    Ok(())
}
