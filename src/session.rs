//! Interactive analysis session.
//!
//! [`FourierSession`] ties the pipeline together for a drawing front end:
//! it collects the raw pen trace, recomputes the derived state whenever an
//! input changes and feeds the resulting phasors to a
//! [`ReconstructionEngine`].
//!
//! ## Recompute Model
//!
//! Every stage is a pure function of its inputs. A recompute builds the new
//! [`Analysis`] and [`PhasorSet`] completely before swapping them in, so a
//! failed recompute leaves the previously published state untouched and the
//! engine never observes a partial result.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::animation::{Frame, ReconstructionEngine};
use crate::clock::{Clock, MonotonicClock};
use crate::config::{validate_sample_density, AnalyzerConfig, AnimationConfig, SortPolicy};
use crate::error::{FourierError, Result};
use crate::math::Point2D;
use crate::phasor::{build_phasor_set, PhasorSet};
use crate::sampler::{resample, UniformSignal};
use crate::spectrum::{compute_spectrum_with, Spectrum};

/// Resampled signal and its spectrum, produced together.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    signal: UniformSignal,
    spectrum: Spectrum,
}

impl Analysis {
    /// Run resampling and spectrum extraction for a closed path.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::DegenerateInput`] for paths without length and
    /// [`FourierError::InvalidParameter`] for an invalid configuration.
    pub fn compute(points: &[Point2D], config: &AnalyzerConfig) -> Result<Self> {
        let signal = resample(points, config.sample_density)?;
        let spectrum = compute_spectrum_with(
            &signal,
            config.spectrum_min,
            config.spectrum_max,
            config.spectral_method,
        )?;
        Ok(Self { signal, spectrum })
    }

    #[must_use]
    pub fn signal(&self) -> &UniformSignal {
        &self.signal
    }

    #[must_use]
    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }
}

/// Controller state for the shape analyzer screen.
#[derive(Debug)]
pub struct FourierSession<C: Clock = MonotonicClock> {
    config: AnalyzerConfig,

    /// Pen trace, closed by `finish_drawing`.
    raw_path: Vec<Point2D>,

    drawing: bool,

    /// `raw_path` is the trace behind `analysis`.
    path_analysed: bool,

    /// Latest successful analysis.
    analysis: Option<Arc<Analysis>>,

    /// Phasors derived from `analysis`, shared with the engine.
    phasors: Arc<PhasorSet>,

    selected_frequency: Option<i32>,

    engine: ReconstructionEngine<C>,
}

impl FourierSession<MonotonicClock> {
    /// Create a session animated in wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] if either configuration is
    /// invalid.
    pub fn new(config: AnalyzerConfig, animation: &AnimationConfig) -> Result<Self> {
        Self::with_clock(config, animation, MonotonicClock::new())
    }
}

impl Default for FourierSession<MonotonicClock> {
    fn default() -> Self {
        Self {
            config: AnalyzerConfig::default(),
            raw_path: Vec::new(),
            drawing: false,
            path_analysed: false,
            analysis: None,
            phasors: Arc::new(PhasorSet::default()),
            selected_frequency: None,
            engine: ReconstructionEngine::default(),
        }
    }
}

impl<C: Clock> FourierSession<C> {
    /// Create a session driven by a custom clock.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] if either configuration is
    /// invalid.
    pub fn with_clock(config: AnalyzerConfig, animation: &AnimationConfig, clock: C) -> Result<Self> {
        config.validate()?;
        let engine = ReconstructionEngine::with_clock(animation, clock)?;
        Ok(Self {
            config,
            raw_path: Vec::new(),
            drawing: false,
            path_analysed: false,
            analysis: None,
            phasors: Arc::new(PhasorSet::default()),
            selected_frequency: None,
            engine,
        })
    }

    // =========================================================================
    // DRAWING INPUT
    // =========================================================================

    /// Begin a new pen trace at `point`.
    ///
    /// The animation stops; the previous analysis stays visible until the new
    /// trace is finished.
    pub fn start_drawing(&mut self, point: Point2D) {
        self.raw_path.clear();
        self.raw_path.push(point);
        self.drawing = true;
        self.path_analysed = false;
        self.engine.stop();
    }

    /// Extend the current trace. Ignored when no trace is in progress.
    pub fn continue_drawing(&mut self, point: Point2D) {
        if self.drawing {
            self.raw_path.push(point);
        }
    }

    /// Close the trace and analyse it.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::DegenerateInput`] if the trace has no length.
    /// The previous analysis and phasors are kept in that case.
    pub fn finish_drawing(&mut self) -> Result<()> {
        if !self.drawing {
            return Ok(());
        }
        self.drawing = false;

        if let Some(&first) = self.raw_path.first() {
            self.raw_path.push(first);
        }

        let config = self.config.clone();
        self.recompute(&config).inspect_err(|err| {
            warn!(%err, points = self.raw_path.len(), "drawing rejected");
        })
    }

    // =========================================================================
    // PIPELINE
    // =========================================================================

    /// Run the whole pipeline for the current raw path under `config` and
    /// publish the result.
    fn recompute(&mut self, config: &AnalyzerConfig) -> Result<()> {
        let analysis = Analysis::compute(&self.raw_path, config)?;
        let phasors = Self::phasors_for(&analysis, config)?;

        self.analysis = Some(Arc::new(analysis));
        self.path_analysed = true;
        self.publish_phasors(phasors);
        Ok(())
    }

    /// Rebuild only the phasor set from the existing analysis.
    fn rebuild_phasors(&mut self, config: &AnalyzerConfig) -> Result<()> {
        if let Some(analysis) = &self.analysis {
            let phasors = Self::phasors_for(analysis, config)?;
            self.publish_phasors(phasors);
        }
        Ok(())
    }

    fn phasors_for(analysis: &Analysis, config: &AnalyzerConfig) -> Result<PhasorSet> {
        build_phasor_set(
            &analysis.spectrum,
            config.lower_frequency,
            config.upper_frequency,
            config.limit_count,
            config.sort_policy,
        )
    }

    fn publish_phasors(&mut self, phasors: PhasorSet) {
        self.phasors = Arc::new(phasors);
        self.engine.set_phasors(Arc::clone(&self.phasors));
    }

    /// Whether the raw path is the finished trace the current analysis was
    /// built from. A rejected trace is never re-analysed.
    fn has_finished_path(&self) -> bool {
        !self.drawing && self.path_analysed
    }

    // =========================================================================
    // PARAMETERS
    // =========================================================================

    /// Change the resampling density and re-analyse the finished trace.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] for non-positive densities;
    /// the previous density is kept.
    pub fn set_sample_density(&mut self, density: f64) -> Result<()> {
        validate_sample_density(density).inspect_err(|err| warn!(%err, "density rejected"))?;

        let config = self.config.clone().with_sample_density(density);
        if self.has_finished_path() {
            self.recompute(&config)?;
        }
        self.config = config;
        debug!(density, "sample density changed");
        Ok(())
    }

    /// Change the window of non-zero frequencies in the phasor set.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] if the window exceeds the
    /// analysed range; the previous window is kept.
    pub fn set_frequency_window(&mut self, lower: i32, upper: i32) -> Result<()> {
        self.config
            .validate_window(lower, upper)
            .inspect_err(|err| warn!(%err, "frequency window rejected"))?;

        let config = self.config.clone().with_frequency_window(lower, upper);
        self.rebuild_phasors(&config)?;
        self.config = config;
        Ok(())
    }

    /// Cap the phasor set to the largest `limit` non-DC terms, or lift the cap.
    ///
    /// # Errors
    ///
    /// Propagates phasor set construction failures; the previous limit is kept.
    pub fn set_limit_count(&mut self, limit: Option<usize>) -> Result<()> {
        let config = self.config.clone().with_limit_count(limit);
        self.rebuild_phasors(&config)?;
        self.config = config;
        Ok(())
    }

    /// Change the display order of the arms.
    ///
    /// # Errors
    ///
    /// Propagates phasor set construction failures; the previous order is kept.
    pub fn set_sort_policy(&mut self, policy: SortPolicy) -> Result<()> {
        let config = self.config.clone().with_sort_policy(policy);
        self.rebuild_phasors(&config)?;
        self.config = config;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] for a zero step.
    pub fn set_step_size(&mut self, step_ms: u32) -> Result<()> {
        self.engine
            .set_step_size(step_ms)
            .inspect_err(|err| warn!(%err, "step size rejected"))
    }

    /// Move the step size by `delta`, clamped to the stepper range
    /// [`AnimationConfig::MIN_STEP_SIZE_MS`]..=[`AnimationConfig::MAX_STEP_SIZE_MS`].
    ///
    /// # Returns
    ///
    /// The step size now in effect.
    ///
    /// # Errors
    ///
    /// Only fails if the clamped value is rejected by the engine.
    pub fn adjust_step_size(&mut self, delta: i32) -> Result<u32> {
        let step = (i64::from(self.engine.step_size_ms()) + i64::from(delta)).clamp(
            i64::from(AnimationConfig::MIN_STEP_SIZE_MS),
            i64::from(AnimationConfig::MAX_STEP_SIZE_MS),
        );
        let step = u32::try_from(step)
            .map_err(|_| FourierError::invalid_parameter(format!("step size {step} out of range")))?;
        self.engine.set_step_size(step)?;
        Ok(step)
    }

    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] for negative or non-finite
    /// factors.
    pub fn set_time_factor(&mut self, factor: f64) -> Result<()> {
        self.engine
            .set_time_factor(factor)
            .inspect_err(|err| warn!(%err, "time factor rejected"))
    }

    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] for offsets of a full period
    /// or more.
    pub fn set_time_offset(&mut self, offset_ms: u32) -> Result<()> {
        self.engine
            .set_time_offset(offset_ms)
            .inspect_err(|err| warn!(%err, "time offset rejected"))
    }

    /// Choose the frequency whose coefficient is reported, or clear the choice.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::FrequencyOutOfRange`] if the frequency is not
    /// analysed; the previous selection is kept.
    pub fn select_frequency(&mut self, frequency: Option<i32>) -> Result<()> {
        if let Some(k) = frequency {
            if !(self.config.spectrum_min..=self.config.spectrum_max).contains(&k) {
                return Err(FourierError::frequency_out_of_range(
                    k,
                    self.config.spectrum_min,
                    self.config.spectrum_max,
                ));
            }
        }
        self.selected_frequency = frequency;
        Ok(())
    }

    // =========================================================================
    // ANIMATION
    // =========================================================================

    pub fn start_animation(&mut self) {
        self.engine.start();
    }

    pub fn pause_animation(&mut self) {
        self.engine.pause();
    }

    pub fn stop_animation(&mut self) {
        self.engine.stop();
    }

    /// Pause the animation at `time_ms` within the period.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] outside `[0, PERIOD_MS]`.
    pub fn scrub_to(&mut self, time_ms: f64) -> Result<()> {
        self.engine.set_time(time_ms)
    }

    /// Advance the animation and return the frame to draw.
    pub fn tick(&mut self) -> Frame {
        self.engine.tick()
    }

    // =========================================================================
    // OUTPUTS
    // =========================================================================

    /// Resampled signal as points, empty before the first analysis.
    #[must_use]
    pub fn resampled_points(&self) -> Vec<Point2D> {
        self.analysis
            .as_ref()
            .map(|a| a.signal.points())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn magnitude_plot(&self) -> Vec<Point2D> {
        self.analysis
            .as_ref()
            .map(|a| a.spectrum.magnitude_plot())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn phase_plot(&self) -> Vec<Point2D> {
        self.analysis
            .as_ref()
            .map(|a| a.spectrum.phase_plot())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn animation_phasors(&self) -> &Arc<PhasorSet> {
        &self.phasors
    }

    #[must_use]
    pub fn trail(&self) -> &[Point2D] {
        self.engine.trail()
    }

    /// Polar form of the selected coefficient, e.g. `"12.50 ∠ -0.25 π"`.
    #[must_use]
    pub fn selected_coefficient(&self) -> Option<String> {
        let k = self.selected_frequency?;
        let analysis = self.analysis.as_ref()?;
        analysis.spectrum.format_coefficient(k).ok()
    }

    #[must_use]
    pub const fn selected_frequency(&self) -> Option<i32> {
        self.selected_frequency
    }

    #[must_use]
    pub fn analysis(&self) -> Option<&Arc<Analysis>> {
        self.analysis.as_ref()
    }

    #[must_use]
    pub fn raw_path(&self) -> &[Point2D] {
        &self.raw_path
    }

    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        self.drawing
    }

    #[must_use]
    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    #[must_use]
    pub const fn engine(&self) -> &ReconstructionEngine<C> {
        &self.engine
    }
}
