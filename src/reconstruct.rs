//! Offline reconstruction of a loop from its phasors.
//!
//! The animation engine builds the same curve incrementally; this module
//! evaluates it in one go, which is what quality checks need.
//!
//! ## Reconstruction Quality
//!
//! Fidelity depends on:
//! - the frequency window: wider windows recover sharper corners
//! - `limit_count`: dropping small terms removes detail first
//! - the sample density the spectrum was computed from

use crate::math::Point2D;
use crate::phasor::PhasorSet;

/// Evaluate the phasor sum at `n_points` uniformly spaced times `t = i/n`.
///
/// Matches the parameterization of a [`UniformSignal`](crate::UniformSignal)
/// with the same number of samples.
#[must_use]
pub fn reconstruct_signal(phasors: &PhasorSet, n_points: usize) -> Vec<Point2D> {
    (0..n_points)
        .map(|i| phasors.evaluate(i as f64 / n_points as f64))
        .collect()
}

/// Root mean square distance between two point sequences.
///
/// Returns infinity when the lengths differ and 0 for two empty sequences.
#[must_use]
pub fn compute_reconstruction_error(original: &[Point2D], reconstructed: &[Point2D]) -> f64 {
    if original.len() != reconstructed.len() {
        return f64::INFINITY;
    }

    if original.is_empty() {
        return 0.0;
    }

    let mse: f64 = original
        .iter()
        .zip(reconstructed.iter())
        .map(|(o, r)| {
            let d = o.distance(*r);
            d * d
        })
        .sum::<f64>()
        / original.len() as f64;

    mse.sqrt()
}
