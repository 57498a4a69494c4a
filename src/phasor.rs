//! Rotating phasors and the filtered, ordered sets that drive reconstruction.
//!
//! A [`Phasor`] is one Fourier term in polar form. A [`PhasorSet`] is the
//! subset of a [`Spectrum`] selected for animation: the DC term, every
//! frequency of a window, optionally capped to the strongest terms, and put
//! into a display order. Sets are rebuilt wholesale, never edited in place.

use std::f64::consts::TAU;

use num_complex::Complex64;
use tracing::debug;

use crate::config::SortPolicy;
use crate::error::Result;
use crate::math::Point2D;
use crate::spectrum::{polar, Spectrum};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One rotating arm: `magnitude · e^(i(2π·frequency·t + phase))`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Phasor {
    /// Turns per period. Negative values rotate clockwise.
    pub frequency: i32,
    /// Arm length, non-negative.
    pub magnitude: f64,
    /// Angle at `t = 0`, in `(-π, π]`.
    pub phase: f64,
}

impl Phasor {
    #[must_use]
    pub const fn new(frequency: i32, magnitude: f64, phase: f64) -> Self {
        Self {
            frequency,
            magnitude,
            phase,
        }
    }

    /// Polar decomposition of a spectrum coefficient.
    #[must_use]
    pub fn from_complex(frequency: i32, coefficient: Complex64) -> Self {
        let (magnitude, phase) = polar(coefficient);
        Self::new(frequency, magnitude, phase)
    }

    #[must_use]
    pub fn from_rectangular(frequency: i32, real: f64, imaginary: f64) -> Self {
        Self::from_complex(frequency, Complex64::new(real, imaginary))
    }

    #[must_use]
    pub fn real(&self) -> f64 {
        self.magnitude * self.phase.cos()
    }

    #[must_use]
    pub fn imaginary(&self) -> f64 {
        self.magnitude * self.phase.sin()
    }

    #[must_use]
    pub fn to_complex(&self) -> Complex64 {
        Complex64::from_polar(self.magnitude, self.phase)
    }

    /// Sum of two phasors of the same frequency.
    ///
    /// Phasors of different frequencies do not combine into a single phasor;
    /// the result is then the zero phasor at frequency 0.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        if self.frequency != other.frequency {
            return Self::new(0, 0.0, 0.0);
        }
        Self::from_complex(self.frequency, self.to_complex() + other.to_complex())
    }

    /// Arm vector at `time`, measured in periods.
    #[must_use]
    pub fn at(&self, time: f64) -> Complex64 {
        let phi = TAU * time * f64::from(self.frequency) + self.phase;
        Complex64::from_polar(self.magnitude, phi)
    }
}

/// A drawn arm of the epicycle chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arm {
    pub frequency: i32,
    /// Radius of the circle the arm sweeps.
    pub magnitude: f64,
    /// Tail, the previous arm's tip.
    pub start: Point2D,
    /// Tip.
    pub end: Point2D,
}

/// Ordered phasors selected from a spectrum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhasorSet {
    phasors: Vec<Phasor>,
}

impl PhasorSet {
    /// Wrap phasors in the given iteration order.
    #[must_use]
    pub fn new(phasors: Vec<Phasor>) -> Self {
        Self { phasors }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phasors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phasors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Phasor> {
        self.phasors.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Phasor] {
        &self.phasors
    }

    /// Frequencies in iteration order.
    #[must_use]
    pub fn frequencies(&self) -> Vec<i32> {
        self.phasors.iter().map(|p| p.frequency).collect()
    }

    /// Position of the chain's tip at `time` (in periods).
    ///
    /// Complex addition commutes, so the iteration order does not matter. An
    /// empty set evaluates to the origin.
    #[must_use]
    pub fn evaluate(&self, time: f64) -> Point2D {
        self.phasors
            .iter()
            .map(|p| p.at(time))
            .sum::<Complex64>()
            .into()
    }

    /// The arms at `time` (in periods), chained tail to head from the origin.
    #[must_use]
    pub fn arms(&self, time: f64) -> Vec<Arm> {
        let mut start = Point2D::ORIGIN;
        self.phasors
            .iter()
            .map(|p| {
                let end = start + Point2D::from(p.at(time));
                let arm = Arm {
                    frequency: p.frequency,
                    magnitude: p.magnitude,
                    start,
                    end,
                };
                start = end;
                arm
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a PhasorSet {
    type Item = &'a Phasor;
    type IntoIter = std::slice::Iter<'a, Phasor>;

    fn into_iter(self) -> Self::IntoIter {
        self.phasors.iter()
    }
}

/// Select, limit and order phasors from a spectrum.
///
/// # Arguments
///
/// * `spectrum` - Source coefficients
/// * `lower`, `upper` - Inclusive window of non-zero frequencies to include.
///   An inverted window selects none.
/// * `limit_count` - Keep only this many of the largest non-DC phasors
/// * `sort_policy` - Final iteration order
///
/// Frequency 0 is always included and never removed by the limit: it carries
/// the centroid, and dropping it would shift the whole reconstruction.
///
/// # Errors
///
/// Returns [`FourierError::FrequencyOutOfRange`](crate::FourierError::FrequencyOutOfRange)
/// if frequency 0 or any frequency of the window lies outside the spectrum.
pub fn build_phasor_set(
    spectrum: &Spectrum,
    lower: i32,
    upper: i32,
    limit_count: Option<usize>,
    sort_policy: SortPolicy,
) -> Result<PhasorSet> {
    let dc = Phasor::from_complex(0, spectrum.coefficient(0)?);

    // Bounds first: the window sizes the buffer below.
    if lower <= upper {
        spectrum.coefficient(lower)?;
        spectrum.coefficient(upper)?;
    }

    let window = usize::try_from(i64::from(upper) - i64::from(lower) + 1).unwrap_or(0);
    let mut others = Vec::with_capacity(window.min(spectrum.len()));
    for frequency in lower..=upper {
        if frequency == 0 {
            continue;
        }
        others.push(Phasor::from_complex(frequency, spectrum.coefficient(frequency)?));
    }

    if let Some(limit) = limit_count {
        retain_largest(&mut others, limit);
    }

    let mut phasors = Vec::with_capacity(others.len() + 1);
    phasors.push(dc);
    phasors.extend(others);

    if let Some(compare) = sort_policy.comparator() {
        phasors.sort_by(compare);
    }

    debug!(
        lower,
        upper,
        ?limit_count,
        ?sort_policy,
        phasors = phasors.len(),
        "built phasor set"
    );

    Ok(PhasorSet::new(phasors))
}

/// Keep the `limit` largest-magnitude phasors, preserving their order.
fn retain_largest(phasors: &mut Vec<Phasor>, limit: usize) {
    if phasors.len() <= limit {
        return;
    }

    let mut ranked: Vec<usize> = (0..phasors.len()).collect();
    ranked.sort_by(|&a, &b| phasors[a].magnitude.total_cmp(&phasors[b].magnitude));

    let mut keep = vec![true; phasors.len()];
    for &dropped in &ranked[..phasors.len() - limit] {
        keep[dropped] = false;
    }

    let mut flags = keep.into_iter();
    phasors.retain(|_| flags.next().unwrap_or(false));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FourierError;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;

    /// Seven non-zero terms plus DC over [-10, 10], all with distinct magnitudes.
    fn seven_term_spectrum() -> Spectrum {
        let terms = [(0, 4.0), (1, 40.0), (-1, 12.0), (2, 9.0), (-2, 6.0), (3, 3.0), (-3, 2.0), (4, 1.0)];
        let coefficients = (-10..=10)
            .map(|k| {
                terms
                    .iter()
                    .find(|&&(f, _)| f == k)
                    .map_or(Complex64::new(0.0, 0.0), |&(_, r)| Complex64::from_polar(r, 0.3))
            })
            .collect();
        Spectrum::new(-10, coefficients)
    }

    #[test]
    fn test_polar_conversion() {
        let p = Phasor::from_rectangular(3, 0.0, 2.0);
        assert_relative_eq!(p.magnitude, 2.0);
        assert_relative_eq!(p.phase, PI / 2.0);
        assert_abs_diff_eq!(p.real(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.imaginary(), 2.0);

        let negative_axis = Phasor::from_rectangular(1, -1.0, -0.0);
        assert_relative_eq!(negative_axis.phase, PI);
    }

    #[test]
    fn test_combine() {
        let a = Phasor::from_rectangular(2, 1.0, 0.0);
        let b = Phasor::from_rectangular(2, 0.0, 1.0);
        let sum = a.combine(&b);
        assert_eq!(sum.frequency, 2);
        assert_relative_eq!(sum.magnitude, 2.0_f64.sqrt());
        assert_relative_eq!(sum.phase, PI / 4.0);

        let mismatched = a.combine(&Phasor::new(3, 1.0, 0.0));
        assert_eq!(mismatched, Phasor::new(0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation() {
        let p = Phasor::new(1, 2.0, 0.0);
        let quarter = p.at(0.25);
        assert_abs_diff_eq!(quarter.re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(quarter.im, 2.0);

        let backwards = Phasor::new(-1, 2.0, 0.0).at(0.25);
        assert_relative_eq!(backwards.im, -2.0);
    }

    #[test]
    fn test_window_always_includes_dc() {
        let spectrum = seven_term_spectrum();
        let set = build_phasor_set(&spectrum, 2, 4, None, SortPolicy::None).unwrap();
        assert_eq!(set.frequencies(), vec![0, 2, 3, 4]);

        let window = build_phasor_set(&spectrum, -2, 2, None, SortPolicy::None).unwrap();
        assert_eq!(window.frequencies(), vec![0, -2, -1, 1, 2]);

        let inverted = build_phasor_set(&spectrum, 5, -5, None, SortPolicy::None).unwrap();
        assert_eq!(inverted.frequencies(), vec![0]);
    }

    #[test]
    fn test_limit_keeps_largest_and_dc() {
        let spectrum = seven_term_spectrum();
        for policy in [
            SortPolicy::None,
            SortPolicy::ByDescendingMagnitude,
            SortPolicy::ByAscendingAbsFrequency,
        ] {
            let set = build_phasor_set(&spectrum, -3, 4, Some(3), policy).unwrap();
            assert_eq!(set.len(), 4, "policy {policy:?}");

            let mut frequencies = set.frequencies();
            frequencies.sort_unstable();
            assert_eq!(frequencies, vec![-1, 0, 1, 2]);
        }
    }

    #[test]
    fn test_limit_zero_keeps_only_dc() {
        let spectrum = seven_term_spectrum();
        let set = build_phasor_set(&spectrum, -3, 4, Some(0), SortPolicy::None).unwrap();
        assert_eq!(set.frequencies(), vec![0]);
    }

    #[test]
    fn test_sort_policies() {
        let spectrum = seven_term_spectrum();

        let by_magnitude =
            build_phasor_set(&spectrum, -3, 4, None, SortPolicy::ByDescendingMagnitude).unwrap();
        assert_eq!(by_magnitude.frequencies(), vec![1, -1, 2, -2, 0, 3, -3, 4]);

        let by_speed =
            build_phasor_set(&spectrum, -3, 4, None, SortPolicy::ByAscendingAbsFrequency).unwrap();
        assert_eq!(by_speed.frequencies(), vec![0, -1, 1, -2, 2, -3, 3, 4]);
    }

    #[test]
    fn test_order_does_not_change_sum() {
        let spectrum = seven_term_spectrum();
        let plain = build_phasor_set(&spectrum, -3, 4, None, SortPolicy::None).unwrap();
        let sorted =
            build_phasor_set(&spectrum, -3, 4, None, SortPolicy::ByDescendingMagnitude).unwrap();

        for t in [0.0, 0.13, 0.5, 0.77] {
            let a = plain.evaluate(t);
            let b = sorted.evaluate(t);
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
            assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_arm_chain() {
        let set = PhasorSet::new(vec![Phasor::new(0, 1.0, 0.0), Phasor::new(1, 2.0, 0.0)]);
        let arms = set.arms(0.25);
        assert_eq!(arms.len(), 2);
        assert_eq!(arms[0].start, Point2D::ORIGIN);
        assert_eq!(arms[1].start, arms[0].end);
        assert_abs_diff_eq!(arms[1].end.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(arms[1].end.y, 2.0);
        let tip = set.evaluate(0.25);
        assert_abs_diff_eq!(arms[1].end.x, tip.x, epsilon = 1e-12);
        assert_abs_diff_eq!(arms[1].end.y, tip.y, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_set_is_origin() {
        let set = PhasorSet::default();
        assert!(set.arms(0.3).is_empty());
        assert_eq!(set.evaluate(0.3), Point2D::ORIGIN);
    }

    #[test]
    fn test_window_outside_spectrum() {
        let spectrum = seven_term_spectrum();
        assert!(matches!(
            build_phasor_set(&spectrum, -11, 3, None, SortPolicy::None),
            Err(FourierError::FrequencyOutOfRange { frequency: -11, .. })
        ));
        assert!(matches!(
            build_phasor_set(&spectrum, -3, 11, None, SortPolicy::None),
            Err(FourierError::FrequencyOutOfRange { frequency: 11, .. })
        ));
    }

    #[test]
    fn test_full_i32_window_is_rejected() {
        let spectrum = seven_term_spectrum();
        assert!(matches!(
            build_phasor_set(&spectrum, i32::MIN, i32::MAX, Some(3), SortPolicy::None),
            Err(FourierError::FrequencyOutOfRange {
                frequency: i32::MIN,
                min: -10,
                max: 10
            })
        ));
    }
}
