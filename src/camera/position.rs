use glam::DVec3;

pub const MANTISSA_MAX: f64 = 10.0;
pub const MANTISSA_MIN: f64 = 0.1;
/// Below this mantissa length the position is treated as the literal origin
pub const ORIGIN_DEAD_ZONE: f64 = 1e-9;

/// World position stored as `mantissa * 2^exponent`.
///
/// The mantissa length is kept inside `[MANTISSA_MIN, MANTISSA_MAX]` (or in
/// the dead zone around the origin) so movement deltas, which are applied in
/// mantissa units, keep full precision at any depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingOrigin {
    mantissa: DVec3,
    exponent: i32,
}

impl FloatingOrigin {
    /// Build from a plain world position, normalizing immediately
    pub fn new(world: DVec3) -> Self {
        let mut position = Self::from_parts(world, 0);
        position.renormalize();
        position
    }

    /// Build from raw parts without normalizing
    pub fn from_parts(mantissa: DVec3, exponent: i32) -> Self {
        Self { mantissa, exponent }
    }

    pub fn mantissa(&self) -> DVec3 {
        self.mantissa
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// `2^exponent`
    pub fn scale(&self) -> f64 {
        2f64.powi(self.exponent)
    }

    pub fn world_position(&self) -> DVec3 {
        self.mantissa * self.scale()
    }

    /// Displace the mantissa by `direction * speed * dt`.
    ///
    /// Call [`FloatingOrigin::renormalize`] once after all of a frame's
    /// displacements have been applied.
    pub fn translate(&mut self, direction: DVec3, speed: f64, dt: f64) {
        let displacement = direction * speed * dt;
        if displacement.is_finite() {
            self.mantissa += displacement;
        }
    }

    /// Restore the mantissa range; returns the change in exponent
    pub fn renormalize(&mut self) -> i32 {
        let start = self.exponent;
        let mut length = self.mantissa.length();

        if !length.is_finite() {
            return 0;
        }

        while length > MANTISSA_MAX {
            self.mantissa *= 0.5;
            self.exponent += 1;
            length *= 0.5;
        }

        while length < MANTISSA_MIN && length > ORIGIN_DEAD_ZONE {
            self.mantissa *= 2.0;
            self.exponent -= 1;
            length *= 2.0;
        }

        self.exponent - start
    }

    /// Scale the whole position by `2^step` around the origin
    pub fn zoom(&mut self, step: i32) {
        self.exponent += step;
    }

    pub fn is_normalized(&self) -> bool {
        let length = self.mantissa.length();
        length <= ORIGIN_DEAD_ZONE || (MANTISSA_MIN..=MANTISSA_MAX).contains(&length)
    }
}

impl Default for FloatingOrigin {
    fn default() -> Self {
        Self::new(DVec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_single_grow_step() {
        let mut position = FloatingOrigin::from_parts(DVec3::new(11.0, 0.0, 0.0), 3);
        let delta = position.renormalize();

        assert_eq!(delta, 1);
        assert_eq!(position.exponent(), 4);
        assert!((position.mantissa().length() - 5.5).abs() < EPSILON);
    }

    #[test]
    fn test_renormalize_idempotent() {
        let mut position = FloatingOrigin::from_parts(DVec3::new(11.0, 0.0, 0.0), 3);
        position.renormalize();
        let settled = position;

        assert_eq!(position.renormalize(), 0);
        assert_eq!(position, settled);
    }

    #[test]
    fn test_shrink_loops_until_in_range() {
        let mut position = FloatingOrigin::from_parts(DVec3::new(0.0, 0.001, 0.0), 0);
        let delta = position.renormalize();

        assert!(delta < 0);
        assert!(position.is_normalized());
        assert!((position.world_position().y - 0.001).abs() < EPSILON);
    }

    #[test]
    fn test_grow_loops_until_in_range() {
        let mut position = FloatingOrigin::from_parts(DVec3::new(5000.0, -3.0, 7.0), -2);
        let before = position.world_position();
        position.renormalize();

        assert!(position.is_normalized());
        assert!((position.world_position() - before).length() < EPSILON);
    }

    #[test]
    fn test_origin_dead_zone_left_alone() {
        let mut position = FloatingOrigin::from_parts(DVec3::ZERO, 0);
        assert_eq!(position.renormalize(), 0);
        assert_eq!(position.exponent(), 0);
    }

    #[test]
    fn test_translate_ignores_non_finite() {
        let mut position = FloatingOrigin::new(DVec3::new(0.0, 0.0, -4.0));
        let before = position;
        position.translate(DVec3::X, f64::INFINITY, 1.0);
        assert_eq!(position, before);
    }

    #[test]
    fn test_zoom_scales_world_position() {
        let mut position = FloatingOrigin::new(DVec3::new(0.0, 0.0, -4.0));
        position.zoom(-1);
        assert!((position.world_position().z + 2.0).abs() < EPSILON);
        position.zoom(2);
        assert!((position.world_position().z + 8.0).abs() < EPSILON);
    }
}
