//! Error types for loop analysis and phasor animation.
//!
//! Every stage of the pipeline (resampling, spectrum analysis, phasor
//! selection, animation control) reports failures through [`FourierError`].
//! A failing stage never publishes partial output downstream.

use thiserror::Error;

/// Main error type for loop decomposition and reconstruction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FourierError {
    /// The drawn path cannot be turned into a periodic signal.
    #[error("Degenerate input: {points} points with total arc length {arc_length}")]
    DegenerateInput { points: usize, arc_length: f64 },

    /// A spectrum was queried outside the frequency range it was built for.
    #[error("Frequency {frequency} is outside the analysed range [{min}, {max}]")]
    FrequencyOutOfRange { frequency: i32, min: i32, max: i32 },

    /// A configuration value was rejected at the boundary.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for loop analysis operations.
pub type Result<T> = std::result::Result<T, FourierError>;

impl FourierError {
    /// Create a degenerate input error.
    #[must_use]
    pub const fn degenerate_input(points: usize, arc_length: f64) -> Self {
        Self::DegenerateInput { points, arc_length }
    }

    /// Create a frequency out of range error.
    #[must_use]
    pub const fn frequency_out_of_range(frequency: i32, min: i32, max: i32) -> Self {
        Self::FrequencyOutOfRange {
            frequency,
            min,
            max,
        }
    }

    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
