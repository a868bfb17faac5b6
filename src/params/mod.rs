pub mod controls;

pub use controls::{ControlEvent, Controls, KeyLatch};

use std::ops::{Add, RangeInclusive};

pub const ITERATION_RANGE: RangeInclusive<i32> = 8..=256;
pub const ITERATION_STEP: i32 = 16;
pub const POWER_RANGE: RangeInclusive<f32> = 2.0..=16.0;
pub const POWER_STEP: f32 = 1.0;
pub const BAILOUT_RANGE: RangeInclusive<f32> = 1.5..=8.0;
pub const BAILOUT_STEP: f32 = 0.5;

pub const DEFAULT_MAX_ITERATIONS: i32 = 128;
pub const DEFAULT_POWER: f32 = 8.0;
pub const DEFAULT_BAILOUT: f32 = 2.0;
pub const DEFAULT_FOV: f32 = 45.0;

/// Apply `delta` then saturate into `[min, max]`
pub fn bump<T>(value: T, delta: T, min: T, max: T) -> T
where
    T: Add<Output = T> + PartialOrd + Copy,
{
    let next = value + delta;
    if next < min {
        min
    } else if next > max {
        max
    } else {
        next
    }
}

/// Per-frame scalar state handed to the shaders.
///
/// Mutated by key edges (`Controls`) and by [`RenderParameters::advance`] /
/// [`RenderParameters::set_resolution`]; read once per frame by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParameters {
    pub resolution: (u32, u32),
    pub elapsed: f32,
    pub max_iterations: i32,
    pub power: f32,
    pub bailout: f32,
    pub auto_rotate: bool,
    /// Level of detail, gently oscillating over time
    pub lod: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl RenderParameters {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: (width, height),
            elapsed: 0.0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            power: DEFAULT_POWER,
            bailout: DEFAULT_BAILOUT,
            auto_rotate: false,
            lod: 1.0,
            fov: DEFAULT_FOV,
        }
    }

    /// Advance time-driven state by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.lod = 1.0 + (self.elapsed * 0.3).sin() * 0.5;
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = (width, height);
    }

    pub fn bump_iterations(&mut self, delta: i32) {
        self.max_iterations = bump(
            self.max_iterations,
            delta,
            *ITERATION_RANGE.start(),
            *ITERATION_RANGE.end(),
        );
    }

    pub fn bump_power(&mut self, delta: f32) {
        self.power = bump(self.power, delta, *POWER_RANGE.start(), *POWER_RANGE.end());
    }

    pub fn bump_bailout(&mut self, delta: f32) {
        self.bailout = bump(
            self.bailout,
            delta,
            *BAILOUT_RANGE.start(),
            *BAILOUT_RANGE.end(),
        );
    }

    pub fn toggle_auto_rotate(&mut self) {
        self.auto_rotate = !self.auto_rotate;
    }
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_saturates_both_ways() {
        assert_eq!(bump(10, -16, 8, 256), 8);
        assert_eq!(bump(250, 16, 8, 256), 256);
        assert_eq!(bump(128, 16, 8, 256), 144);
        assert_eq!(bump(2.5f32, -1.0, 2.0, 16.0), 2.0);
    }

    #[test]
    fn test_iterations_floor_and_ceiling() {
        let mut params = RenderParameters::default();
        for _ in 0..40 {
            params.bump_iterations(-ITERATION_STEP);
        }
        assert_eq!(params.max_iterations, 8);

        for _ in 0..40 {
            params.bump_iterations(ITERATION_STEP);
        }
        assert_eq!(params.max_iterations, 256);
    }

    #[test]
    fn test_power_and_bailout_clamped() {
        let mut params = RenderParameters::default();
        params.bump_power(100.0);
        params.bump_bailout(-100.0);
        assert_eq!(params.power, 16.0);
        assert_eq!(params.bailout, 1.5);
    }

    #[test]
    fn test_advance_accumulates_time() {
        let mut params = RenderParameters::default();
        params.advance(0.25);
        params.advance(0.25);
        params.advance(-1.0);
        params.advance(f32::NAN);
        assert!((params.elapsed - 0.5).abs() < 1e-6);
        assert!((params.lod - (1.0 + (0.15f32).sin() * 0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_toggle_auto_rotate() {
        let mut params = RenderParameters::default();
        params.toggle_auto_rotate();
        assert!(params.auto_rotate);
        params.toggle_auto_rotate();
        assert!(!params.auto_rotate);
    }
}
