use std::time::Instant;

/// Frame clock - tracks delta time between frames
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_tick: Instant,
}

impl Clock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Seconds since the previous tick; advances the clock
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    /// Seconds since the clock was created
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Forget time spent away, e.g. while minimized
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts frames and reports the rate once per interval
#[derive(Debug, Clone, Copy)]
pub struct FpsCounter {
    interval: f32,
    accumulated: f32,
    frames: u32,
}

impl FpsCounter {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulated: 0.0,
            frames: 0,
        }
    }

    /// Record one frame; returns the average FPS when an interval completes
    pub fn frame(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.accumulated += delta;

        if self.accumulated < self.interval {
            return None;
        }

        let fps = self.frames as f32 / self.accumulated;
        self.frames = 0;
        self.accumulated = 0.0;
        Some(fps)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        assert!(delta >= 0.009);
        assert!(clock.elapsed() >= delta);
    }

    #[test]
    fn clock_resets() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        clock.reset();

        assert!(clock.tick() < 0.009);
    }

    #[test]
    fn fps_reported_once_per_interval() {
        let mut fps = FpsCounter::new(1.0);
        let reports: Vec<f32> = (0..130).filter_map(|_| fps.frame(1.0 / 60.0)).collect();

        assert_eq!(reports.len(), 2);
        assert!((reports[0] - 60.0).abs() < 1.0);
    }
}
