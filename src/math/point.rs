//! Planar points, interchangeable with complex numbers.

use std::ops::{Add, AddAssign, Mul, Sub};

use num_complex::Complex64;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2-D point. Read as the complex number `x + iy` by the Fourier math.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    /// The origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation, `fraction = 0` is `self` and `1` is `other`.
    #[must_use]
    pub fn lerp(self, other: Self, fraction: f64) -> Self {
        self + (other - self) * fraction
    }

    #[must_use]
    pub const fn to_complex(self) -> Complex64 {
        Complex64::new(self.x, self.y)
    }
}

impl From<Complex64> for Point2D {
    fn from(c: Complex64) -> Self {
        Self::new(c.re, c.im)
    }
}

impl From<Point2D> for Complex64 {
    fn from(p: Point2D) -> Self {
        p.to_complex()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Point2D {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point2D {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point2D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}
