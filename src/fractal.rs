use glam::DVec3;

/// Mandelbulb distance estimator, mirroring the one in `shaders/common.wgsl`.
///
/// Evaluated on the CPU in double precision to drive distance-adaptive
/// camera speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mandelbulb {
    pub power: f64,
    pub bailout: f64,
    pub max_iterations: u32,
}

impl Mandelbulb {
    pub fn new(power: f64, bailout: f64, max_iterations: u32) -> Self {
        Self {
            power,
            bailout,
            max_iterations,
        }
    }

    /// Estimated distance from `pos` to the surface (negative or ~0 inside)
    pub fn distance(&self, pos: DVec3) -> f64 {
        let mut z = pos;
        let mut dr = 1.0;
        let mut r = z.length();

        for _ in 0..self.max_iterations {
            r = z.length();
            if r > self.bailout || r == 0.0 {
                break;
            }

            let theta = (z.z / r).clamp(-1.0, 1.0).acos() * self.power;
            let phi = z.y.atan2(z.x) * self.power;

            dr = r.powf(self.power - 1.0) * self.power * dr + 1.0;
            let zr = r.powf(self.power);

            z = zr
                * DVec3::new(
                    theta.sin() * phi.cos(),
                    theta.sin() * phi.sin(),
                    theta.cos(),
                )
                + pos;
        }

        if r == 0.0 {
            return 0.0;
        }

        0.5 * r.ln() * r / dr
    }
}

/// Radians per second of the auto-rotate spin, as in the shaders
pub const ROTATE_SPEED: f64 = 0.2;

/// Rotate `p` about the world Y axis, matching `rotate_y` in WGSL
pub fn rotate_y(p: DVec3, angle: f64) -> DVec3 {
    let (s, c) = angle.sin_cos();
    DVec3::new(c * p.x + s * p.z, p.y, -s * p.x + c * p.z)
}

impl Default for Mandelbulb {
    fn default() -> Self {
        Self::new(8.0, 2.0, 20)
    }
}
