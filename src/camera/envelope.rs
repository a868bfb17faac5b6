pub const DEFAULT_SPEED: f64 = 2.0;
pub const DEFAULT_MIN_SPEED: f64 = 1e-7;
pub const DEFAULT_MAX_SPEED: f64 = 50.0;
pub const SCROLL_FACTOR: f64 = 1.1;

/// Speed limits for camera movement, in mantissa units per second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementEnvelope {
    speed: f64,
    min_speed: f64,
    max_speed: f64,
    depth_compensated: bool,
}

impl MovementEnvelope {
    /// Bounds are swapped if given in the wrong order; speed is clamped into them
    pub fn new(speed: f64, min_speed: f64, max_speed: f64, depth_compensated: bool) -> Self {
        let (min_speed, max_speed) = if min_speed <= max_speed {
            (min_speed, max_speed)
        } else {
            (max_speed, min_speed)
        };

        Self {
            speed: speed.clamp(min_speed, max_speed),
            min_speed,
            max_speed,
            depth_compensated,
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn min_speed(&self) -> f64 {
        self.min_speed
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn is_depth_compensated(&self) -> bool {
        self.depth_compensated
    }

    /// Multiply speed by `factor`, saturating at the bounds
    pub fn scale_speed(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.speed = (self.speed * factor).clamp(self.min_speed, self.max_speed);
        }
    }

    /// Apply `steps` mouse-wheel notches: positive speeds up, negative slows down
    pub fn scroll(&mut self, steps: f32) {
        if steps > 0.0 {
            self.scale_speed(SCROLL_FACTOR);
        } else if steps < 0.0 {
            self.scale_speed(1.0 / SCROLL_FACTOR);
        }
    }

    /// Follow an exponent change so world-space speed stays the same.
    ///
    /// Speed and both bounds are scaled by `2^-delta`. Does nothing when depth
    /// compensation is off.
    pub fn rescale_for_exponent(&mut self, delta: i32) {
        if !self.depth_compensated || delta == 0 {
            return;
        }

        let factor = 2f64.powi(-delta);
        self.min_speed *= factor;
        self.max_speed *= factor;
        self.speed = (self.speed * factor).clamp(self.min_speed, self.max_speed);
    }
}

impl Default for MovementEnvelope {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED, DEFAULT_MIN_SPEED, DEFAULT_MAX_SPEED, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_speed() {
        let envelope = MovementEnvelope::new(100.0, 1.0, 10.0, true);
        assert_eq!(envelope.speed(), 10.0);
    }

    #[test]
    fn test_new_orders_bounds() {
        let envelope = MovementEnvelope::new(5.0, 10.0, 1.0, true);
        assert_eq!(envelope.min_speed(), 1.0);
        assert_eq!(envelope.max_speed(), 10.0);
    }

    #[test]
    fn test_scroll_saturates_at_max() {
        let mut envelope = MovementEnvelope::new(45.0, 1e-7, 50.0, true);
        for _ in 0..10 {
            envelope.scroll(1.0);
        }
        assert_eq!(envelope.speed(), 50.0);
    }

    #[test]
    fn test_scroll_saturates_at_min() {
        let mut envelope = MovementEnvelope::new(0.2, 0.1, 50.0, true);
        for _ in 0..20 {
            envelope.scroll(-1.0);
        }
        assert_eq!(envelope.speed(), 0.1);
    }

    #[test]
    fn test_zero_scroll_is_noop() {
        let mut envelope = MovementEnvelope::default();
        envelope.scroll(0.0);
        assert_eq!(envelope.speed(), DEFAULT_SPEED);
    }

    #[test]
    fn test_rescale_halves_per_exponent_step() {
        let mut envelope = MovementEnvelope::new(2.0, 1.0, 8.0, true);
        envelope.rescale_for_exponent(1);

        assert_eq!(envelope.speed(), 1.0);
        assert_eq!(envelope.min_speed(), 0.5);
        assert_eq!(envelope.max_speed(), 4.0);

        envelope.rescale_for_exponent(-2);
        assert_eq!(envelope.speed(), 4.0);
        assert_eq!(envelope.max_speed(), 16.0);
    }

    #[test]
    fn test_rescale_disabled_without_compensation() {
        let mut envelope = MovementEnvelope::new(2.0, 1.0, 8.0, false);
        envelope.rescale_for_exponent(3);
        assert_eq!(envelope.speed(), 2.0);
        assert_eq!(envelope.max_speed(), 8.0);
    }
}
