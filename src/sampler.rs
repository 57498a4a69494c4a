//! Arc-length resampling of drawn paths.
//!
//! A pen trace arrives as an irregularly spaced polyline. Fourier analysis
//! needs a periodic signal sampled at equal parameter steps, so the path is
//! re-expressed as a function of normalized distance travelled along it and
//! sampled uniformly on `[0, 1)`.
//!
//! ## Pipeline
//!
//! 1. Total arc length `L` of the polyline
//! 2. Cumulative-length keys `length_so_far / L` for every input point
//! 3. Sample count `N = floor(density · L)`, at least 1
//! 4. For `t = i/N`, interpolate between the bracketing keys
//!
//! `t = 1` is never stored: for a closed loop it is the same point as `t = 0`.

use num_complex::Complex64;
use tracing::debug;

use crate::config::validate_sample_density;
use crate::error::{FourierError, Result};
use crate::math::Point2D;

/// Relative tolerance when checking the accumulated length against `L`.
const LENGTH_TOLERANCE: f64 = 1e-9;

/// Largest number of samples a single path may be resampled to.
pub const MAX_SAMPLES: usize = 1 << 24;

/// A periodic complex signal sampled at a constant parameter interval.
///
/// Sample `i` sits at `t = i · interval`; the first key is exactly 0 and the
/// last key is strictly below 1.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSignal {
    samples: Vec<Complex64>,
    interval: f64,
    arc_length: f64,
}

impl UniformSignal {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sampling interval Δt = 1/N.
    #[must_use]
    pub const fn interval(&self) -> f64 {
        self.interval
    }

    /// Arc length of the path the signal was sampled from.
    #[must_use]
    pub const fn arc_length(&self) -> f64 {
        self.arc_length
    }

    /// Raw complex samples in parameter order.
    #[must_use]
    pub fn samples(&self) -> &[Complex64] {
        &self.samples
    }

    /// Parameter value of sample `index`.
    #[must_use]
    pub fn key(&self, index: usize) -> f64 {
        index as f64 / self.samples.len() as f64
    }

    /// Iterate over `(t, sample)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, Complex64)> + '_ {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &s)| (self.key(i), s))
    }

    /// Samples as points, for drawing the resampled path.
    #[must_use]
    pub fn points(&self) -> Vec<Point2D> {
        self.samples.iter().copied().map(Point2D::from).collect()
    }
}

/// Total arc length of a polyline.
///
/// Zero-length steps between repeated points contribute nothing.
#[must_use]
pub fn total_arc_length(points: &[Point2D]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Resample a path uniformly by arc length.
///
/// The path does not have to be closed, but callers feeding the result into
/// Fourier analysis should repeat the first point at the end so the signal is
/// periodic.
///
/// # Arguments
///
/// * `points` - Ordered pen trace
/// * `sample_density` - Samples per unit of arc length
///
/// # Errors
///
/// - [`FourierError::InvalidParameter`] if `sample_density` is not positive
///   or would produce more than [`MAX_SAMPLES`] samples
/// - [`FourierError::DegenerateInput`] if fewer than 2 points are supplied or
///   the path has zero length
///
/// # Example
///
/// ```
/// use phasor_loop::{resample, Point2D};
///
/// let square = [
///     Point2D::new(0.0, 0.0),
///     Point2D::new(10.0, 0.0),
///     Point2D::new(10.0, 10.0),
///     Point2D::new(0.0, 10.0),
///     Point2D::new(0.0, 0.0),
/// ];
/// let signal = resample(&square, 1.0)?;
/// assert_eq!(signal.len(), 40);
/// assert_eq!(signal.points()[10], Point2D::new(10.0, 0.0));
/// # Ok::<(), phasor_loop::FourierError>(())
/// ```
pub fn resample(points: &[Point2D], sample_density: f64) -> Result<UniformSignal> {
    validate_sample_density(sample_density)?;

    let arc_length = total_arc_length(points);
    if points.len() < 2 || arc_length <= 0.0 || !arc_length.is_finite() {
        return Err(FourierError::degenerate_input(points.len(), arc_length));
    }

    let (keys, anchors) = cumulative_keys(points, arc_length);

    let wanted = (sample_density * arc_length).floor();
    if !wanted.is_finite() || wanted > MAX_SAMPLES as f64 {
        return Err(FourierError::invalid_parameter(format!(
            "sample density {sample_density} over arc length {arc_length} exceeds \
             {MAX_SAMPLES} samples"
        )));
    }
    let sample_count = (wanted as usize).max(1);
    let interval = 1.0 / sample_count as f64;

    let mut samples = Vec::with_capacity(sample_count);
    samples.push(points[0].to_complex());
    for i in 1..sample_count {
        let t = i as f64 / sample_count as f64;
        samples.push(interpolate(&keys, &anchors, t).to_complex());
    }

    debug!(
        input_points = points.len(),
        arc_length,
        samples = sample_count,
        "resampled path"
    );

    Ok(UniformSignal {
        samples,
        interval,
        arc_length,
    })
}

/// Map every input point to its normalized cumulative length.
///
/// Repeated points produce repeated keys; only the first is kept since they
/// map to the same location. The final key is pinned to exactly 1 so every
/// `t < 1` has an upper bracket even after rounding.
fn cumulative_keys(points: &[Point2D], arc_length: f64) -> (Vec<f64>, Vec<Point2D>) {
    let mut keys = Vec::with_capacity(points.len());
    let mut anchors = Vec::with_capacity(points.len());

    keys.push(0.0);
    anchors.push(points[0]);

    let mut walked = 0.0;
    for w in points.windows(2) {
        let step = w[0].distance(w[1]);
        if step == 0.0 {
            continue;
        }
        walked += step;
        keys.push(walked / arc_length);
        anchors.push(w[1]);
    }

    if (walked - arc_length).abs() > LENGTH_TOLERANCE * arc_length {
        debug!(walked, arc_length, "accumulated length drifted from total");
    }
    if let Some(last) = keys.last_mut() {
        *last = 1.0;
    }

    (keys, anchors)
}

/// Interpolate the path position at parameter `t`.
///
/// Brackets are the largest key `<= t` and the smallest key `>= t`. When they
/// coincide, or the segment between them has zero length, the lower point is
/// returned unchanged.
fn interpolate(keys: &[f64], anchors: &[Point2D], t: f64) -> Point2D {
    let upper = keys.partition_point(|&k| k < t).min(keys.len() - 1);
    let lower = if keys[upper] <= t { upper } else { upper.saturating_sub(1) };

    let (t1, t2) = (keys[lower], keys[upper]);
    let (p1, p2) = (anchors[lower], anchors[upper]);

    if t2 <= t1 || p1.distance(p2) == 0.0 {
        return p1;
    }

    p1.lerp(p2, (t - t1) / (t2 - t1))
}
