//! Damped values
//!
//! Frame-stepped exponential followers: every step moves `current` a fixed
//! fraction of the remaining distance toward `target`:
//!
//! ```text
//! current += (target - current) * factor
//! ```
//!
//! A factor of 1.0 snaps to the target on the next step. Small factors give
//! a slow trailing follower. Once the remaining distance drops under the
//! settle epsilon the value snaps, so convergence is exact after a bounded
//! number of frames rather than only in the limit.

use crate::sampler::Sample;
use crate::values::Interpolate;

/// Smallest accepted damping factor
pub const MIN_FACTOR: f32 = 1e-4;

/// Default distance under which a damped value snaps to its target
pub const DEFAULT_SETTLE_EPSILON: f32 = 1e-3;

/// Per-frame damping factor in (0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DampingFactor(f32);

impl DampingFactor {
    /// Snap to target every frame
    pub const SNAP: DampingFactor = DampingFactor(1.0);

    /// Create a factor, clamping into (0, 1]. NaN becomes `SNAP`.
    pub fn new(factor: f32) -> Self {
        if factor.is_nan() {
            return Self::SNAP;
        }
        Self(factor.clamp(MIN_FACTOR, 1.0))
    }

    /// Factor that halves the remaining distance every `half_life` seconds
    /// when stepped once per `frame_dt` seconds
    pub fn from_half_life(half_life: f32, frame_dt: f32) -> Self {
        if half_life <= 0.0 || frame_dt <= 0.0 {
            return Self::SNAP;
        }
        Self::new(1.0 - 0.5f32.powf(frame_dt / half_life))
    }

    pub fn get(&self) -> f32 {
        self.0
    }
}

impl Default for DampingFactor {
    fn default() -> Self {
        Self::SNAP
    }
}

impl From<f32> for DampingFactor {
    fn from(factor: f32) -> Self {
        Self::new(factor)
    }
}

/// A value that trails its target with exponential damping
#[derive(Clone, Debug)]
pub struct Damped<T: Interpolate> {
    current: T,
    target: T,
    factor: DampingFactor,
    settle_epsilon: f32,
}

impl<T: Interpolate> Damped<T> {
    pub fn new(initial: T, factor: impl Into<DampingFactor>) -> Self {
        Self {
            current: initial.clone(),
            target: initial,
            factor: factor.into(),
            settle_epsilon: DEFAULT_SETTLE_EPSILON,
        }
    }

    /// Override the snap distance
    pub fn with_settle_epsilon(mut self, epsilon: f32) -> Self {
        self.settle_epsilon = epsilon.max(0.0);
        self
    }

    pub fn current(&self) -> T {
        self.current.clone()
    }

    pub fn target(&self) -> T {
        self.target.clone()
    }

    pub fn factor(&self) -> DampingFactor {
        self.factor
    }

    pub fn set_factor(&mut self, factor: impl Into<DampingFactor>) {
        self.factor = factor.into();
    }

    pub fn set_target(&mut self, target: T) {
        self.target = target;
    }

    /// Jump to a value with no transition
    pub fn snap_to(&mut self, value: T) {
        self.current = value.clone();
        self.target = value;
    }

    /// Apply one damping update toward the current target
    pub fn advance(&mut self) -> T {
        let next = self.current.lerp(&self.target, self.factor.get());
        // A step below float precision makes no progress; snap instead of stalling.
        let stalled = next.distance(&self.current) == 0.0;
        if stalled || next.approx_eq(&self.target, self.settle_epsilon) {
            self.current = self.target.clone();
        } else {
            self.current = next;
        }
        self.current.clone()
    }

    /// Set the target verbatim and advance one frame
    pub fn step_to(&mut self, target: T) -> T {
        self.target = target;
        self.advance()
    }

    /// Derive the target from a frame sample and advance one frame
    pub fn step<F>(&mut self, sample: &Sample, project: F) -> T
    where
        F: FnOnce(&Sample) -> T,
    {
        self.target = project(sample);
        self.advance()
    }

    pub fn is_settled(&self) -> bool {
        self.current.distance(&self.target) == 0.0
            || self.current.approx_eq(&self.target, self.settle_epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::Vec2;

    fn frames_to_settle(factor: f32) -> usize {
        let mut value = Damped::new(0.0_f32, factor);
        value.set_target(1000.0);
        let mut frames = 0;
        while !value.is_settled() {
            value.advance();
            frames += 1;
            assert!(frames < 200_000, "factor {factor} did not converge");
        }
        frames
    }

    #[test]
    fn test_converges_for_all_factors() {
        for factor in [1.0, 0.9, 0.5, 0.15, 0.08, 0.01, 0.001] {
            let frames = frames_to_settle(factor);
            assert!(frames >= 1);
        }
    }

    #[test]
    fn test_settled_value_equals_target_exactly() {
        let mut value = Damped::new(0.0_f32, 0.2);
        value.set_target(-4000.0);
        for _ in 0..200 {
            value.advance();
        }
        assert_eq!(value.current(), -4000.0);
    }

    #[test]
    fn test_factor_one_snaps() {
        let mut value = Damped::new(Vec2::ZERO, 1.0);
        assert_eq!(value.step_to(Vec2::new(120.0, -40.0)), Vec2::new(120.0, -40.0));
        assert_eq!(frames_to_settle(1.0), 1);
    }

    #[test]
    fn test_slow_follower_trails_fast_follower() {
        let mut lens = Damped::new(0.0_f32, 0.1);
        let mut dot = Damped::new(0.0_f32, 0.9);
        lens.step_to(100.0);
        dot.step_to(100.0);
        assert!(lens.current() < dot.current());
    }

    #[test]
    fn test_monotonic_approach_never_overshoots() {
        let mut value = Damped::new(0.0_f32, 0.35);
        let mut prev = 0.0;
        for _ in 0..100 {
            let v = value.step_to(50.0);
            assert!(v >= prev && v <= 50.0);
            prev = v;
        }
    }

    #[test]
    fn test_factor_clamping() {
        assert_eq!(DampingFactor::new(5.0).get(), 1.0);
        assert_eq!(DampingFactor::new(0.0).get(), MIN_FACTOR);
        assert_eq!(DampingFactor::new(f32::NAN), DampingFactor::SNAP);
    }

    #[test]
    fn test_half_life() {
        let factor = DampingFactor::from_half_life(0.5, 0.5);
        assert!((factor.get() - 0.5).abs() < 1e-6);

        // Sixty frames of a one-second half-life at 60fps halve the distance
        let factor = DampingFactor::from_half_life(1.0, 1.0 / 60.0);
        let mut value = Damped::new(0.0_f32, factor).with_settle_epsilon(0.0);
        value.set_target(1.0);
        for _ in 0..60 {
            value.advance();
        }
        assert!((value.current() - 0.5).abs() < 1e-3);
    }
}
