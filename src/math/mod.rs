//! Numeric building blocks.
//!
//! This module provides:
//! - [`point`]: planar points interchangeable with complex numbers
//! - [`fft`]: FFT-backed evaluation of Fourier series coefficients

pub mod fft;
pub mod point;

pub use fft::fft_coefficients;
pub use point::Point2D;
