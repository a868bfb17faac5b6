/// Turns absolute cursor samples into look deltas.
///
/// The first sample after creation or [`PointerTracker::reset`] only seeds
/// the previous position; it never rotates the camera. The Y delta is
/// inverted here (previous minus current) so screen-up motion is positive.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    last: Option<(f64, f64)>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Feed the current cursor position; returns `(dx, dy)` once seeded
    pub fn sample(&mut self, x: f64, y: f64) -> Option<(f32, f32)> {
        let previous = self.last.replace((x, y))?;
        Some(((x - previous.0) as f32, (previous.1 - y) as f32))
    }

    /// Forget the previous sample, e.g. after the cursor is re-captured
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn is_seeded(&self) -> bool {
        self.last.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_seeds_only() {
        let mut tracker = PointerTracker::new();
        assert!(!tracker.is_seeded());
        assert_eq!(tracker.sample(640.0, 360.0), None);
        assert!(tracker.is_seeded());
    }

    #[test]
    fn test_y_inverted() {
        let mut tracker = PointerTracker::new();
        tracker.sample(100.0, 100.0);
        assert_eq!(tracker.sample(110.0, 90.0), Some((10.0, 10.0)));
        assert_eq!(tracker.sample(110.0, 95.0), Some((0.0, -5.0)));
    }

    #[test]
    fn test_reset_reseeds() {
        let mut tracker = PointerTracker::new();
        tracker.sample(0.0, 0.0);
        tracker.reset();
        assert_eq!(tracker.sample(5000.0, -5000.0), None);
        assert_eq!(tracker.sample(5001.0, -5000.0), Some((1.0, 0.0)));
    }
}
