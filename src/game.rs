//! Circle drawing game.
//!
//! The player picks a target frequency and draws a loop. The score measures
//! how much of the loop's non-DC spectral energy sits in that single
//! frequency: a clean circle traversed once counter-clockwise scores close
//! to 100 for frequency 1, a figure traversed the other way round for -1.

use std::collections::HashMap;

use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::error::{FourierError, Result};
use crate::math::Point2D;
use crate::session::Analysis;
use crate::spectrum::Spectrum;

/// Largest absolute target frequency.
pub const MAX_TARGET_FREQUENCY: i32 = 100;

/// Share of the non-DC magnitude carried by `target`, in percent.
///
/// ```text
/// score = 100 · |c_target| / Σ_(k ≠ 0) |c_k|
/// ```
///
/// A spectrum without any non-DC content scores 0.
///
/// # Errors
///
/// Returns [`FourierError::FrequencyOutOfRange`] if `target` is not in the
/// spectrum.
pub fn circle_score(spectrum: &Spectrum, target: i32) -> Result<f64> {
    let hit = spectrum.coefficient(target)?.norm();
    let total: f64 = spectrum
        .iter()
        .filter(|&(k, _)| k != 0)
        .map(|(_, c)| c.norm())
        .sum();

    if total <= 0.0 {
        return Ok(0.0);
    }
    Ok(100.0 * hit / total)
}

fn validate_target(target: i32) -> Result<()> {
    if target == 0 || target.abs() > MAX_TARGET_FREQUENCY {
        return Err(FourierError::invalid_parameter(format!(
            "target frequency must be between -{MAX_TARGET_FREQUENCY} and \
             {MAX_TARGET_FREQUENCY}, excluding zero, got {target}"
        )));
    }
    Ok(())
}

/// State of one game screen.
#[derive(Debug, Clone)]
pub struct CircleGame {
    config: AnalyzerConfig,
    target_frequency: i32,
    points: Vec<Point2D>,
    drawing: bool,
    /// Spectrum of the last finished drawing.
    spectrum: Option<Spectrum>,
    current_score: f64,
    /// Best score per target frequency, kept for the lifetime of the game.
    high_scores: HashMap<i32, f64>,
}

impl Default for CircleGame {
    fn default() -> Self {
        Self {
            config: AnalyzerConfig::circle_game(),
            target_frequency: -1,
            points: Vec::new(),
            drawing: false,
            spectrum: None,
            current_score: 0.0,
            high_scores: HashMap::new(),
        }
    }
}

impl CircleGame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a given target frequency.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] for 0 or targets beyond
    /// ±[`MAX_TARGET_FREQUENCY`].
    pub fn with_target(target: i32) -> Result<Self> {
        let mut game = Self::default();
        game.set_target_frequency(target)?;
        Ok(game)
    }

    /// Change the target and rescore the last drawing against it.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::InvalidParameter`] for 0 or targets beyond
    /// ±[`MAX_TARGET_FREQUENCY`]; the previous target is kept.
    pub fn set_target_frequency(&mut self, target: i32) -> Result<()> {
        validate_target(target)?;
        self.target_frequency = target;
        self.current_score = 0.0;
        if self.spectrum.is_some() {
            self.score()?;
        }
        Ok(())
    }

    pub fn start_drawing(&mut self, point: Point2D) {
        self.points.clear();
        self.points.push(point);
        self.spectrum = None;
        self.current_score = 0.0;
        self.drawing = true;
    }

    pub fn continue_drawing(&mut self, point: Point2D) {
        if self.drawing {
            self.points.push(point);
        }
    }

    /// Close the drawing and score it.
    ///
    /// # Returns
    ///
    /// The new score, or `None` if the drawing had too few points to count.
    ///
    /// # Errors
    ///
    /// Returns [`FourierError::DegenerateInput`] if the drawing has no length.
    pub fn finish_drawing(&mut self) -> Result<Option<f64>> {
        if !self.drawing {
            return Ok(None);
        }
        self.drawing = false;

        if self.points.len() <= 2 {
            return Ok(None);
        }
        self.points.push(self.points[0]);

        let analysis = Analysis::compute(&self.points, &self.config)?;
        self.spectrum = Some(analysis.spectrum().clone());
        self.score().map(Some)
    }

    fn score(&mut self) -> Result<f64> {
        let Some(spectrum) = &self.spectrum else {
            return Ok(0.0);
        };
        let score = circle_score(spectrum, self.target_frequency)?;
        self.current_score = score;

        let best = self.high_scores.entry(self.target_frequency).or_insert(0.0);
        if score > *best {
            *best = score;
            debug!(target = self.target_frequency, score, "new high score");
        }
        Ok(score)
    }

    #[must_use]
    pub const fn target_frequency(&self) -> i32 {
        self.target_frequency
    }

    #[must_use]
    pub const fn current_score(&self) -> f64 {
        self.current_score
    }

    /// Best score reached for the current target, 0 if none yet.
    #[must_use]
    pub fn high_score(&self) -> f64 {
        self.high_scores
            .get(&self.target_frequency)
            .copied()
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        self.drawing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;
    use std::f64::consts::PI;

    fn draw_circle(game: &mut CircleGame, radius: f64, clockwise: bool) {
        let n: i32 = 360;
        let sign = if clockwise { -1.0 } else { 1.0 };
        game.start_drawing(Point2D::new(radius, 0.0));
        for i in 1..n {
            let a = sign * 2.0 * PI * f64::from(i) / f64::from(n);
            game.continue_drawing(Point2D::new(radius * a.cos(), radius * a.sin()));
        }
    }

    #[test]
    fn test_score_formula() {
        let spectrum = Spectrum::new(
            -2,
            vec![
                Complex64::new(1.0, 0.0),
                Complex64::new(0.0, 3.0),
                Complex64::new(50.0, 0.0),
                Complex64::new(4.0, 0.0),
                Complex64::new(0.0, 0.0),
            ],
        );
        assert_relative_eq!(circle_score(&spectrum, 1).unwrap(), 50.0);
        assert_relative_eq!(circle_score(&spectrum, -1).unwrap(), 37.5);
        assert!(circle_score(&spectrum, 3).is_err());

        let flat = Spectrum::new(-1, vec![Complex64::new(0.0, 0.0); 3]);
        assert_eq!(circle_score(&flat, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_circle_scores_high_for_its_direction() {
        let mut game = CircleGame::with_target(1).unwrap();
        draw_circle(&mut game, 50.0, false);
        let score = game.finish_drawing().unwrap().unwrap();
        assert!(score > 99.0, "score {score}");
        assert_relative_eq!(game.high_score(), score);

        game.set_target_frequency(-1).unwrap();
        assert!(game.current_score() < 1.0);
        assert!(game.high_score() < 1.0);
    }

    #[test]
    fn test_clockwise_circle() {
        let mut game = CircleGame::new();
        assert_eq!(game.target_frequency(), -1);
        draw_circle(&mut game, 30.0, true);
        let score = game.finish_drawing().unwrap().unwrap();
        assert!(score > 99.0, "score {score}");
    }

    #[test]
    fn test_high_score_kept_per_target() {
        let mut game = CircleGame::with_target(1).unwrap();
        draw_circle(&mut game, 50.0, false);
        let best = game.finish_drawing().unwrap().unwrap();

        // A lopsided square scores lower and leaves the record alone.
        game.start_drawing(Point2D::new(0.0, 0.0));
        for p in [(40.0, 0.0), (40.0, 10.0), (0.0, 10.0)] {
            game.continue_drawing(p.into());
        }
        let worse = game.finish_drawing().unwrap().unwrap();
        assert!(worse < best);
        assert_relative_eq!(game.current_score(), worse);
        assert_relative_eq!(game.high_score(), best);
    }

    #[test]
    fn test_too_few_points() {
        let mut game = CircleGame::new();
        game.start_drawing(Point2D::new(0.0, 0.0));
        game.continue_drawing(Point2D::new(5.0, 5.0));
        assert_eq!(game.finish_drawing().unwrap(), None);
        assert_eq!(game.points().len(), 2);
        assert!(!game.is_drawing());
    }

    #[test]
    fn test_degenerate_drawing() {
        let mut game = CircleGame::new();
        game.start_drawing(Point2D::new(1.0, 1.0));
        game.continue_drawing(Point2D::new(1.0, 1.0));
        game.continue_drawing(Point2D::new(1.0, 1.0));
        assert!(matches!(
            game.finish_drawing(),
            Err(FourierError::DegenerateInput { .. })
        ));
        assert_eq!(game.current_score(), 0.0);
    }

    #[test]
    fn test_target_validation() {
        let mut game = CircleGame::new();
        assert!(game.set_target_frequency(0).is_err());
        assert!(game.set_target_frequency(101).is_err());
        assert!(game.set_target_frequency(-101).is_err());
        assert_eq!(game.target_frequency(), -1);

        assert!(game.set_target_frequency(-100).is_ok());
        assert!(CircleGame::with_target(0).is_err());
    }
}
