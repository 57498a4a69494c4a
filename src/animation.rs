//! Tick-driven epicycle animation.
//!
//! [`ReconstructionEngine`] turns a [`PhasorSet`] into frames. Simulated time
//! runs over one period of [`PERIOD_MS`] milliseconds and is read from a
//! [`Clock`] on every tick, scaled by a playback factor and shifted by an
//! offset. Alongside the instantaneous arm chain it keeps a trail: the phasor
//! sum sampled at every multiple of a fixed step, so the trail depends only on
//! simulated time and step size, never on how often `tick` is called.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::clock::{Clock, MonotonicClock};
use crate::config::{
    validate_step_size, validate_time_factor, validate_time_offset, AnimationConfig, PERIOD_MS,
};
use crate::error::{FourierError, Result};
use crate::math::Point2D;
use crate::phasor::{Arm, PhasorSet};

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No simulated time has elapsed; the trail is empty.
    #[default]
    Stopped,
    /// Simulated time follows the clock.
    Running,
    /// Simulated time is frozen, e.g. while scrubbing.
    Paused,
}

/// One rendered instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Simulated time of this frame in milliseconds.
    pub time_ms: f64,
    /// The period ended on this tick and the trail was restarted.
    pub wrapped: bool,
    /// Arm chain in phasor iteration order.
    pub arms: Vec<Arm>,
    /// End of the last arm, the origin for an empty set.
    pub tip: Point2D,
}

/// Deterministic, resumable phasor animation.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use phasor_loop::{AnimationConfig, ManualClock, Phasor, PhasorSet, ReconstructionEngine};
///
/// let clock = ManualClock::new();
/// let config = AnimationConfig::default().with_time_factor(1.0);
/// let mut engine = ReconstructionEngine::with_clock(&config, clock.clone())?;
/// engine.set_phasors(Arc::new(PhasorSet::new(vec![Phasor::new(1, 10.0, 0.0)])));
///
/// engine.start();
/// clock.advance(Duration::from_millis(250));
/// let frame = engine.tick();
///
/// assert_eq!(frame.time_ms, 250.0);
/// assert_eq!(engine.trail().len(), 26); // 0, 10, ..., 250 ms
/// # Ok::<(), phasor_loop::FourierError>(())
/// ```
#[derive(Debug)]
pub struct ReconstructionEngine<C: Clock = MonotonicClock> {
    /// Time source.
    clock: C,

    state: EngineState,

    /// Phasors being animated, replaced wholesale.
    phasors: Arc<PhasorSet>,

    /// Trail sampling granularity in simulated milliseconds.
    step_size_ms: u32,

    /// Simulated milliseconds per clock millisecond.
    time_factor: f64,

    /// Start point within the period.
    time_offset_ms: u32,

    /// Simulated milliseconds accumulated up to `anchor`.
    elapsed_ms: f64,

    /// Clock reading at which the current running stretch began.
    anchor: std::time::Duration,

    /// Phasor sums at visited step multiples, in time order.
    trail: Vec<Point2D>,

    /// Index of the next step multiple to visit.
    next_step: u64,
}

impl ReconstructionEngine<MonotonicClock> {
    /// Create an engine driven by the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] if `config` is invalid.
    pub fn new(config: &AnimationConfig) -> Result<Self> {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl Default for ReconstructionEngine<MonotonicClock> {
    fn default() -> Self {
        Self::from_parts(&AnimationConfig::default(), MonotonicClock::new())
    }
}

impl<C: Clock> ReconstructionEngine<C> {
    /// Create an engine driven by a custom clock.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] if `config` is invalid.
    pub fn with_clock(config: &AnimationConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, clock))
    }

    fn from_parts(config: &AnimationConfig, clock: C) -> Self {
        let anchor = clock.now();
        let mut engine = Self {
            clock,
            state: EngineState::Stopped,
            phasors: Arc::new(PhasorSet::default()),
            step_size_ms: config.step_size_ms,
            time_factor: config.time_factor,
            time_offset_ms: config.time_offset_ms,
            elapsed_ms: 0.0,
            anchor,
            trail: Vec::new(),
            next_step: 0,
        };
        engine.reset_trail();
        engine
    }

    // =========================================================================
    // STATE MACHINE
    // =========================================================================

    /// Begin or resume advancing simulated time.
    pub fn start(&mut self) {
        if self.state == EngineState::Running {
            return;
        }
        self.anchor = self.clock.now();
        self.state = EngineState::Running;
        debug!(elapsed_ms = self.elapsed_ms, "animation started");
    }

    /// Freeze simulated time at its current value.
    pub fn pause(&mut self) {
        if self.state != EngineState::Running {
            return;
        }
        self.elapsed_ms = self.simulated_elapsed_ms();
        self.state = EngineState::Paused;
        debug!(elapsed_ms = self.elapsed_ms, "animation paused");
    }

    /// Return to time zero and clear the trail.
    pub fn stop(&mut self) {
        self.state = EngineState::Stopped;
        self.elapsed_ms = 0.0;
        self.anchor = self.clock.now();
        self.reset_trail();
        debug!("animation stopped");
    }

    /// Pause at an explicit simulated time, bypassing the clock.
    ///
    /// Scrubbing backwards past the last trail sample restarts the trail so
    /// it only ever holds samples up to the shown time.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] if `time_ms` is not within
    /// `[0, PERIOD_MS]`.
    pub fn set_time(&mut self, time_ms: f64) -> Result<()> {
        if !(0.0..=PERIOD_MS).contains(&time_ms) {
            return Err(FourierError::invalid_parameter(format!(
                "animation time must lie within one period, got {time_ms} ms"
            )));
        }

        if self.last_visited_ms().is_some_and(|last| time_ms < last) {
            self.reset_trail();
        }
        self.elapsed_ms = time_ms - f64::from(self.time_offset_ms);
        self.state = EngineState::Paused;
        Ok(())
    }

    // =========================================================================
    // PARAMETERS
    // =========================================================================

    /// Replace the animated phasors and restart the period.
    pub fn set_phasors(&mut self, phasors: Arc<PhasorSet>) {
        self.phasors = phasors;
        self.restart();
        debug!(phasors = self.phasors.len(), "phasor set replaced");
    }

    /// Change the trail step. The trail is rebuilt from the start point.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] for a zero step; the
    /// previous step is kept.
    pub fn set_step_size(&mut self, step_ms: u32) -> Result<()> {
        validate_step_size(step_ms)?;
        if step_ms != self.step_size_ms {
            self.step_size_ms = step_ms;
            self.reset_trail();
            debug!(step_ms, "trail step changed");
        }
        Ok(())
    }

    /// Change the start point within the period. The trail is rebuilt.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] if the offset is not below
    /// one period; the previous offset is kept.
    pub fn set_time_offset(&mut self, offset_ms: u32) -> Result<()> {
        validate_time_offset(offset_ms)?;
        if offset_ms != self.time_offset_ms {
            self.time_offset_ms = offset_ms;
            self.reset_trail();
            debug!(offset_ms, "time offset changed");
        }
        Ok(())
    }

    /// Change the playback speed without jumping in simulated time.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] for negative or non-finite
    /// factors; the previous factor is kept.
    pub fn set_time_factor(&mut self, factor: f64) -> Result<()> {
        validate_time_factor(factor)?;
        if self.state == EngineState::Running {
            self.elapsed_ms = self.simulated_elapsed_ms();
            self.anchor = self.clock.now();
        }
        self.time_factor = factor;
        Ok(())
    }

    // =========================================================================
    // TICK
    // =========================================================================

    /// Simulated time in milliseconds: `factor · elapsed + offset`.
    #[must_use]
    pub fn current_time_ms(&self) -> f64 {
        self.simulated_elapsed_ms() + f64::from(self.time_offset_ms)
    }

    /// Advance to the clock's current reading and produce a frame.
    ///
    /// Past the end of the period the trail and elapsed time restart and the
    /// frame is drawn at time 0. Otherwise the trail is extended to every
    /// unvisited step multiple up to the current time.
    pub fn tick(&mut self) -> Frame {
        let mut time_ms = self.current_time_ms();
        let wrapped = time_ms > PERIOD_MS;

        if wrapped {
            trace!(time_ms, "period complete, restarting");
            self.restart();
            time_ms = 0.0;
        } else if self.state != EngineState::Stopped {
            self.fill_trail(time_ms);
        }

        let arms = self.phasors.arms(time_ms / PERIOD_MS);
        let tip = arms.last().map_or(Point2D::ORIGIN, |arm| arm.end);

        Frame {
            time_ms,
            wrapped,
            arms,
            tip,
        }
    }

    fn fill_trail(&mut self, time_ms: f64) {
        let step = f64::from(self.step_size_ms);
        while self.next_step as f64 * step <= time_ms {
            let t = self.next_step as f64 * step / PERIOD_MS;
            self.trail.push(self.phasors.evaluate(t));
            self.next_step += 1;
        }
    }

    fn simulated_elapsed_ms(&self) -> f64 {
        match self.state {
            EngineState::Running => {
                let since = self.clock.now().saturating_sub(self.anchor);
                self.elapsed_ms + self.time_factor * (since.as_nanos() as f64 / 1_000_000.0)
            }
            EngineState::Stopped | EngineState::Paused => self.elapsed_ms,
        }
    }

    /// Clear the trail and elapsed time, keeping the playback state.
    fn restart(&mut self) {
        self.elapsed_ms = 0.0;
        self.anchor = self.clock.now();
        self.reset_trail();
    }

    fn reset_trail(&mut self) {
        self.trail.clear();
        self.next_step = u64::from(self.time_offset_ms.div_ceil(self.step_size_ms));
    }

    fn last_visited_ms(&self) -> Option<f64> {
        if self.trail.is_empty() {
            return None;
        }
        Some((self.next_step - 1) as f64 * f64::from(self.step_size_ms))
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Phasor sums sampled since the last reset.
    #[must_use]
    pub fn trail(&self) -> &[Point2D] {
        &self.trail
    }

    #[must_use]
    pub fn phasors(&self) -> &Arc<PhasorSet> {
        &self.phasors
    }

    #[must_use]
    pub const fn step_size_ms(&self) -> u32 {
        self.step_size_ms
    }

    #[must_use]
    pub const fn time_factor(&self) -> f64 {
        self.time_factor
    }

    #[must_use]
    pub const fn time_offset_ms(&self) -> u32 {
        self.time_offset_ms
    }

    /// Current parameters as a configuration.
    #[must_use]
    pub fn config(&self) -> AnimationConfig {
        AnimationConfig {
            step_size_ms: self.step_size_ms,
            time_factor: self.time_factor,
            time_offset_ms: self.time_offset_ms,
        }
    }
}
