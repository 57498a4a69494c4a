//! Reconstruction engine behavior under a hand-driven clock.

use std::sync::Arc;
use std::time::Duration;

use phasor_loop::{
    build_phasor_set, compute_reconstruction_error, compute_spectrum, reconstruct_signal,
    resample, AnimationConfig, EngineState, ManualClock, Phasor, PhasorSet, Point2D,
    ReconstructionEngine, SortPolicy,
};
use std::f64::consts::PI;

// =============================================================================
// HELPERS
// =============================================================================

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn engine_with(config: &AnimationConfig) -> (ReconstructionEngine<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let engine = ReconstructionEngine::with_clock(config, clock.clone()).unwrap();
    (engine, clock)
}

fn real_time(step_ms: u32) -> AnimationConfig {
    AnimationConfig::default()
        .with_step_size(step_ms)
        .with_time_factor(1.0)
}

fn epicycles() -> Arc<PhasorSet> {
    Arc::new(PhasorSet::new(vec![
        Phasor::new(0, 2.0, 0.5),
        Phasor::new(1, 20.0, 0.0),
        Phasor::new(-2, 6.0, 1.0),
        Phasor::new(3, 1.5, -2.0),
    ]))
}

fn lemniscate_phasors(k: i32) -> PhasorSet {
    let points: Vec<Point2D> = (0..=500)
        .map(|i| {
            let t = 2.0 * PI * f64::from(i) / 500.0;
            let s = 1.0 + t.sin() * t.sin();
            Point2D::new(60.0 * t.cos() / s, 60.0 * t.sin() * t.cos() / s)
        })
        .collect();
    let signal = resample(&points, 2.0).unwrap();
    let spectrum = compute_spectrum(&signal, -k, k).unwrap();
    build_phasor_set(&spectrum, -k, k, None, SortPolicy::ByDescendingMagnitude).unwrap()
}

// =============================================================================
// PERIOD WRAP
// =============================================================================

#[test]
fn test_wrap_past_period() {
    let (mut engine, clock) = engine_with(&real_time(10));
    engine.set_phasors(epicycles());
    engine.start();

    clock.advance(ms(1000));
    engine.tick();
    assert_eq!(engine.trail().len(), 101);

    clock.advance(ms(5));
    let frame = engine.tick();
    assert!(frame.wrapped);
    assert_eq!(frame.time_ms, 0.0);
    assert!(engine.trail().is_empty());
    assert_eq!(engine.current_time_ms(), 0.0);

    // The next period starts over from the first step.
    clock.advance(ms(20));
    engine.tick();
    assert_eq!(engine.trail().len(), 3);
}

#[test]
fn test_wrap_in_a_single_tick() {
    let (mut engine, clock) = engine_with(&real_time(10));
    engine.set_phasors(epicycles());
    engine.start();

    clock.advance(ms(1005));
    let frame = engine.tick();
    assert!(frame.wrapped);
    assert!(engine.trail().is_empty());
}

#[test]
fn test_wrap_with_offset() {
    let config = real_time(10).with_time_offset(900);
    let (mut engine, clock) = engine_with(&config);
    engine.set_phasors(epicycles());
    engine.start();

    clock.advance(ms(100));
    engine.tick();
    // 900, 910, ..., 1000
    assert_eq!(engine.trail().len(), 11);

    clock.advance(ms(1));
    assert!(engine.tick().wrapped);
    assert!(engine.trail().is_empty());
    assert_eq!(engine.current_time_ms(), 900.0);
}

// =============================================================================
// TRAIL
// =============================================================================

#[test]
fn test_trail_matches_reconstruction() {
    let phasors = lemniscate_phasors(15);
    let (mut engine, clock) = engine_with(&real_time(4));
    engine.set_phasors(Arc::new(phasors.clone()));
    engine.start();

    for _ in 0..60 {
        clock.advance(ms(16));
        engine.tick();
    }
    clock.set(ms(1000));
    engine.tick();

    let expected = reconstruct_signal(&phasors, 250);
    assert_eq!(engine.trail().len(), 251);
    assert!(compute_reconstruction_error(&expected, &engine.trail()[..250]) < 1e-9);
    // Closed loop: the sample at a full period repeats the first.
    assert!(engine.trail()[250].distance(engine.trail()[0]) < 1e-9);
}

#[test]
fn test_trail_independent_of_frame_rate() {
    let phasors = Arc::new(lemniscate_phasors(10));

    let (mut slow, slow_clock) = engine_with(&real_time(10));
    let (mut fast, fast_clock) = engine_with(&real_time(10));
    slow.set_phasors(Arc::clone(&phasors));
    fast.set_phasors(Arc::clone(&phasors));
    slow.start();
    fast.start();

    for _ in 0..12 {
        slow_clock.advance(ms(50));
        slow.tick();
    }
    for _ in 0..100 {
        fast_clock.advance(ms(6));
        fast.tick();
    }

    assert_eq!(slow.trail(), fast.trail());
}

#[test]
fn test_time_factor_scales_playback() {
    let (mut engine, clock) = engine_with(&AnimationConfig::default());
    engine.set_phasors(epicycles());
    engine.start();

    // Default factor 0.1: ten seconds of wall time per period.
    clock.advance(ms(5000));
    let frame = engine.tick();
    assert!((frame.time_ms - 500.0).abs() < 1e-9);
    assert_eq!(engine.trail().len(), 51);
}

#[test]
fn test_empty_phasor_set() {
    let (mut engine, clock) = engine_with(&real_time(10));
    engine.start();
    clock.advance(ms(55));

    let frame = engine.tick();
    assert!(frame.arms.is_empty());
    assert_eq!(frame.tip, Point2D::ORIGIN);
    assert_eq!(engine.trail(), &[Point2D::ORIGIN; 6]);
}

// =============================================================================
// PARAMETER CHANGES
// =============================================================================

#[test]
fn test_offset_change_while_running_clears_trail() {
    let (mut engine, clock) = engine_with(&real_time(10));
    engine.set_phasors(epicycles());
    engine.start();
    clock.advance(ms(400));
    engine.tick();
    assert!(!engine.trail().is_empty());

    engine.set_time_offset(250).unwrap();
    assert!(engine.trail().is_empty());
    assert_eq!(engine.state(), EngineState::Running);

    engine.tick();
    // 250, 260, ..., 650
    assert_eq!(engine.trail().len(), 41);
}

#[test]
fn test_step_change_while_running_clears_trail() {
    let (mut engine, clock) = engine_with(&real_time(10));
    engine.set_phasors(epicycles());
    engine.start();
    clock.advance(ms(400));
    engine.tick();

    engine.set_step_size(16).unwrap();
    assert!(engine.trail().is_empty());

    engine.tick();
    // 0, 16, ..., 400
    assert_eq!(engine.trail().len(), 26);
}

#[test]
fn test_zero_step_rejected() {
    let (mut engine, _clock) = engine_with(&real_time(10));
    assert!(engine.set_step_size(0).is_err());
    assert_eq!(engine.step_size_ms(), 10);
    assert!(ReconstructionEngine::with_clock(&real_time(0), ManualClock::new()).is_err());
}

#[test]
fn test_scrub_then_resume() {
    let (mut engine, clock) = engine_with(&real_time(10));
    engine.set_phasors(epicycles());

    engine.set_time(300.0).unwrap();
    engine.tick();
    assert_eq!(engine.trail().len(), 31);

    engine.start();
    clock.advance(ms(100));
    let frame = engine.tick();
    assert!((frame.time_ms - 400.0).abs() < 1e-9);
    assert_eq!(engine.trail().len(), 41);

    engine.stop();
    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(engine.trail().is_empty());
}
