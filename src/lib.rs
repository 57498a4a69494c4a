//! Phasor Loop
//!
//! Fourier epicycle decomposition of hand-drawn closed loops.
//!
//! A loop is resampled uniformly by arc length, interpreted as a periodic
//! complex signal and decomposed into a finite set of rotating phasors whose
//! sum traces the loop again. The crate covers the whole pipeline from the
//! raw pen trace to a tick-driven animation of the epicycle chain.
//!
//! # Features
//!
//! - **Arc-length resampling**: uniform signal regardless of pen speed
//! - **Bounded spectra**: direct Riemann sums or an FFT fast path
//! - **Phasor selection**: frequency window, largest-N limit, display order
//! - **Deterministic animation**: trails depend on simulated time only,
//!   never on frame rate
//!
//! # Quick Start
//!
//! ```
//! use phasor_loop::{build_phasor_set, compute_spectrum, resample, Point2D, SortPolicy};
//!
//! let square: Vec<Point2D> = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]
//!     .into_iter()
//!     .map(Point2D::from)
//!     .collect();
//!
//! let signal = resample(&square, 2.0)?;
//! assert_eq!(signal.len(), 80);
//!
//! let spectrum = compute_spectrum(&signal, -20, 20)?;
//! let centroid = spectrum[0];
//! assert!((centroid.re - 5.0).abs() < 1e-9 && (centroid.im - 5.0).abs() < 1e-9);
//!
//! let phasors = build_phasor_set(&spectrum, -10, 10, None, SortPolicy::ByDescendingMagnitude)?;
//! assert_eq!(phasors.len(), 21);
//! # Ok::<(), phasor_loop::FourierError>(())
//! ```
//!
//! # Components
//!
//! | Stage | Entry point | Output |
//! |-------|-------------|--------|
//! | Path sampling | [`resample`] | [`UniformSignal`] |
//! | Spectrum analysis | [`compute_spectrum`] | [`Spectrum`] |
//! | Phasor selection | [`build_phasor_set`] | [`PhasorSet`] |
//! | Animation | [`ReconstructionEngine::tick`] | [`Frame`] and trail |
//!
//! [`FourierSession`] wires the stages to drawing input for an interactive
//! front end; [`CircleGame`] scores drawings against a single frequency.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod animation;
pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod math;
pub mod phasor;
pub mod reconstruct;
pub mod sampler;
pub mod session;
pub mod spectrum;

// Re-exports for convenient access
pub use animation::{EngineState, Frame, ReconstructionEngine};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{AnalyzerConfig, AnimationConfig, SortPolicy, SpectralMethod, PERIOD_MS};
pub use error::{FourierError, Result};
pub use game::{circle_score, CircleGame};
pub use math::Point2D;
pub use phasor::{build_phasor_set, Arm, Phasor, PhasorSet};
pub use reconstruct::{compute_reconstruction_error, reconstruct_signal};
pub use sampler::{resample, total_arc_length, UniformSignal};
pub use session::{Analysis, FourierSession};
pub use spectrum::{coefficient, compute_spectrum, compute_spectrum_with, Spectrum};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
