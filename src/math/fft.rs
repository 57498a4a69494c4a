//! FFT-backed evaluation of Fourier series coefficients.
//!
//! A uniform signal holds its `N` samples at `t = i/N`, so the Riemann sum
//!
//! ```text
//! c_k = Σ_i s_i · e^(-2πi·k·i/N) · (1/N)
//! ```
//!
//! is exactly the forward DFT bin `X[k mod N]` scaled by `1/N`. A single FFT
//! therefore yields every coefficient at once, including negative frequencies
//! and frequencies above the Nyquist bound (which alias onto lower bins just
//! like the direct sum does).

use num_complex::Complex64;
use rustfft::{num_complex::Complex, FftPlanner};

/// Compute coefficients `c_k` for every `k` in `k_min..=k_max`.
///
/// # Arguments
///
/// * `samples` - Uniformly spaced samples over one period
/// * `interval` - Sampling interval Δt of the signal
/// * `k_min`, `k_max` - Inclusive frequency range
///
/// # Returns
///
/// Coefficients ordered from `k_min` to `k_max`. Empty if `samples` is empty
/// or the range is inverted.
pub fn fft_coefficients(
    samples: &[Complex64],
    interval: f64,
    k_min: i32,
    k_max: i32,
) -> Vec<Complex64> {
    let n = samples.len();
    if n == 0 || k_min > k_max {
        return vec![];
    }

    let mut buffer: Vec<Complex<f64>> = samples.iter().map(|s| Complex::new(s.re, s.im)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    (k_min..=k_max)
        .map(|k| {
            let bin = i64::from(k).rem_euclid(n as i64) as usize;
            let c = buffer[bin];
            Complex64::new(c.re, c.im) * interval
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn circle_samples(n: usize, radius: f64, turns: f64) -> Vec<Complex64> {
        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                Complex64::from_polar(radius, 2.0 * PI * turns * t)
            })
            .collect()
    }

    #[test]
    fn test_single_frequency() {
        let n = 64;
        let samples = circle_samples(n, 3.0, -2.0);
        let coeffs = fft_coefficients(&samples, 1.0 / n as f64, -4, 4);

        assert_eq!(coeffs.len(), 9);
        // Index 2 is k = -2.
        assert_relative_eq!(coeffs[2].norm(), 3.0, epsilon = 1e-10);
        for (i, c) in coeffs.iter().enumerate() {
            if i != 2 {
                assert!(c.norm() < 1e-10, "k = {} leaked {}", i as i32 - 4, c.norm());
            }
        }
    }

    #[test]
    fn test_aliasing_matches_period() {
        let n = 16;
        let samples = circle_samples(n, 1.0, 3.0);
        let coeffs = fft_coefficients(&samples, 1.0 / n as f64, 3, 19);

        // k and k + N hit the same bin.
        assert_relative_eq!(coeffs[0].re, coeffs[16].re, epsilon = 1e-12);
        assert_relative_eq!(coeffs[0].im, coeffs[16].im, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(fft_coefficients(&[], 1.0, -1, 1).is_empty());
        let samples = circle_samples(8, 1.0, 1.0);
        assert!(fft_coefficients(&samples, 0.125, 2, 1).is_empty());
    }
}
