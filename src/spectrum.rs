//! Fourier series coefficients of a uniform signal.
//!
//! Coefficients are obtained by numerically integrating over one period:
//!
//! ```text
//! c_k = Σ_(t, s) e^(-2πi·k·t) · s · Δt
//! ```
//!
//! where Δt is the signal's own sampling interval. A [`Spectrum`] stores the
//! coefficients for a contiguous integer frequency range.

use std::f64::consts::PI;
use std::ops::Index;

use num_complex::Complex64;
use tracing::debug;

use crate::config::SpectralMethod;
use crate::error::{FourierError, Result};
use crate::math::{fft_coefficients, Point2D};
use crate::sampler::UniformSignal;

/// Complex Fourier coefficient of a single integer frequency.
///
/// Frequency 0 is the mean of the samples, i.e. the centroid of the loop.
#[must_use]
pub fn coefficient(signal: &UniformSignal, frequency: i32) -> Complex64 {
    let dt = signal.interval();
    let k = f64::from(frequency);
    signal
        .iter()
        .map(|(t, s)| Complex64::cis(-2.0 * PI * k * t) * s)
        .sum::<Complex64>()
        * dt
}

/// Polar form `(magnitude, phase)` with the phase in `(-π, π]`.
///
/// `atan2` reports -π for a negative real axis with a -0.0 imaginary part;
/// that direction is folded onto +π.
#[must_use]
pub(crate) fn polar(c: Complex64) -> (f64, f64) {
    let (magnitude, phase) = c.to_polar();
    (magnitude, if phase <= -PI { PI } else { phase })
}

/// Compute the spectrum over `k_min..=k_max` by direct summation.
///
/// # Errors
///
/// Returns [`FourierError::InvalidParameter`] if `k_min > k_max`.
pub fn compute_spectrum(signal: &UniformSignal, k_min: i32, k_max: i32) -> Result<Spectrum> {
    compute_spectrum_with(signal, k_min, k_max, SpectralMethod::Direct)
}

/// Compute the spectrum over `k_min..=k_max` with the chosen method.
///
/// Both methods agree to floating-point tolerance; [`SpectralMethod::Fft`]
/// pays off once the range approaches the sample count.
///
/// # Errors
///
/// Returns [`FourierError::InvalidParameter`] if `k_min > k_max`.
pub fn compute_spectrum_with(
    signal: &UniformSignal,
    k_min: i32,
    k_max: i32,
    method: SpectralMethod,
) -> Result<Spectrum> {
    if k_min > k_max {
        return Err(FourierError::invalid_parameter(format!(
            "frequency range [{k_min}, {k_max}] is empty"
        )));
    }

    let coefficients = match method {
        SpectralMethod::Direct => (k_min..=k_max).map(|k| coefficient(signal, k)).collect(),
        SpectralMethod::Fft => {
            fft_coefficients(signal.samples(), signal.interval(), k_min, k_max)
        }
    };

    debug!(k_min, k_max, ?method, samples = signal.len(), "computed spectrum");

    Ok(Spectrum {
        min_frequency: k_min,
        coefficients,
    })
}

/// Complex coefficients over a contiguous frequency range.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    min_frequency: i32,
    coefficients: Vec<Complex64>,
}

impl Spectrum {
    /// Wrap precomputed coefficients, the first belonging to `min_frequency`.
    #[must_use]
    pub fn new(min_frequency: i32, coefficients: Vec<Complex64>) -> Self {
        Self {
            min_frequency,
            coefficients,
        }
    }

    #[must_use]
    pub const fn min_frequency(&self) -> i32 {
        self.min_frequency
    }

    #[must_use]
    pub fn max_frequency(&self) -> i32 {
        self.min_frequency + self.coefficients.len() as i32 - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Whether `frequency` lies inside the analysed range.
    #[must_use]
    pub fn contains(&self, frequency: i32) -> bool {
        (self.min_frequency..=self.max_frequency()).contains(&frequency)
    }

    /// Coefficient of `frequency`.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::FrequencyOutOfRange`] outside the analysed range.
    pub fn coefficient(&self, frequency: i32) -> Result<Complex64> {
        if !self.contains(frequency) {
            return Err(FourierError::frequency_out_of_range(
                frequency,
                self.min_frequency,
                self.max_frequency(),
            ));
        }
        Ok(self.coefficients[(frequency - self.min_frequency) as usize])
    }

    /// Iterate over `(frequency, coefficient)` pairs in ascending frequency.
    pub fn iter(&self) -> impl Iterator<Item = (i32, Complex64)> + '_ {
        (self.min_frequency..).zip(self.coefficients.iter().copied())
    }

    /// Frequency → magnitude, as points for charting.
    #[must_use]
    pub fn magnitude_plot(&self) -> Vec<Point2D> {
        self.iter()
            .map(|(k, c)| Point2D::new(f64::from(k), c.norm()))
            .collect()
    }

    /// Frequency → phase in radians, as points for charting.
    #[must_use]
    pub fn phase_plot(&self) -> Vec<Point2D> {
        self.iter()
            .map(|(k, c)| Point2D::new(f64::from(k), polar(c).1))
            .collect()
    }

    /// Human readable polar form of a coefficient, e.g. `"12.50 ∠ -0.25 π"`.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::FrequencyOutOfRange`] outside the analysed range.
    pub fn format_coefficient(&self, frequency: i32) -> Result<String> {
        let (magnitude, phase) = polar(self.coefficient(frequency)?);
        Ok(format!("{magnitude:.2} ∠ {:.2} π", phase / PI))
    }
}

impl Index<i32> for Spectrum {
    type Output = Complex64;

    /// # Panics
    ///
    /// Panics if `frequency` is outside the analysed range; that is a contract
    /// violation by the caller.
    fn index(&self, frequency: i32) -> &Complex64 {
        if !self.contains(frequency) {
            panic!(
                "{}",
                FourierError::frequency_out_of_range(
                    frequency,
                    self.min_frequency,
                    self.max_frequency()
                )
            );
        }
        &self.coefficients[(frequency - self.min_frequency) as usize]
    }
}
