use glam::Vec3;

pub const DEFAULT_YAW: f32 = 90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const PITCH_LIMIT: f32 = 89.0;

const WORLD_UP: Vec3 = Vec3::Y;
const DEGENERATE_LENGTH: f32 = 1e-6;

/// Orthonormal camera frame derived from yaw/pitch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// First-person orientation driven by pointer deltas.
///
/// Angles are in degrees. Yaw is unbounded and wraps through the trig
/// functions; pitch is held inside `[-PITCH_LIMIT, PITCH_LIMIT]` so the
/// forward vector never lines up with world up. The basis is a cache of the
/// angles and is rebuilt on every change.
#[derive(Debug, Clone)]
pub struct Orientation {
    yaw: f32,
    pitch: f32,
    sensitivity: f32,
    basis: Basis,
}

impl Orientation {
    pub fn new(yaw: f32, pitch: f32, sensitivity: f32) -> Self {
        let mut orientation = Self {
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            sensitivity: sensitivity.max(0.0),
            basis: Basis {
                forward: Vec3::NEG_Z,
                right: Vec3::X,
                up: Vec3::Y,
            },
        };
        orientation.rebuild_basis();
        orientation
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity.max(0.0);
    }

    pub fn basis(&self) -> Basis {
        self.basis
    }

    /// Rotate by a pointer delta in pixels.
    ///
    /// `dy` must already be inverted (previous minus current sample), so a
    /// positive value means the pointer moved up and the camera pitches up.
    pub fn apply_pointer_delta(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }

        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.rebuild_basis();
    }

    /// Set absolute angles, clamping pitch like a pointer update would
    pub fn set_angles(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.rebuild_basis();
    }

    fn rebuild_basis(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();

        let Some(forward) = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos)
            .try_normalize_above(DEGENERATE_LENGTH)
        else {
            return;
        };

        // forward x world-up has no Y component, which keeps right on the horizon
        let Some(right) = forward.cross(WORLD_UP).try_normalize_above(DEGENERATE_LENGTH) else {
            return;
        };

        let Some(up) = right.cross(forward).try_normalize_above(DEGENERATE_LENGTH) else {
            return;
        };

        self.basis = Basis { forward, right, up };
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::new(DEFAULT_YAW, DEFAULT_PITCH, DEFAULT_SENSITIVITY)
    }
}

trait TryNormalizeAbove: Sized {
    fn try_normalize_above(self, min_length: f32) -> Option<Self>;
}

impl TryNormalizeAbove for Vec3 {
    fn try_normalize_above(self, min_length: f32) -> Option<Self> {
        let length = self.length();
        (length.is_finite() && length > min_length).then(|| self / length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_orthonormal(basis: Basis) {
        assert!((basis.forward.length() - 1.0).abs() < EPSILON);
        assert!((basis.right.length() - 1.0).abs() < EPSILON);
        assert!((basis.up.length() - 1.0).abs() < EPSILON);
        assert!(basis.forward.dot(basis.right).abs() < EPSILON);
        assert!(basis.forward.dot(basis.up).abs() < EPSILON);
        assert!(basis.right.dot(basis.up).abs() < EPSILON);
    }

    #[test]
    fn test_default_looks_down_positive_z() {
        let orientation = Orientation::default();
        let basis = orientation.basis();

        assert!((basis.forward - Vec3::Z).length() < EPSILON);
        assert!((basis.up - Vec3::Y).length() < EPSILON);
        assert!((basis.right - Vec3::NEG_X).length() < EPSILON);
    }

    #[test]
    fn test_basis_orthonormal_across_angles() {
        let mut orientation = Orientation::default();
        for yaw_step in -8..8 {
            for pitch_step in -9..=9 {
                orientation.set_angles(yaw_step as f32 * 47.0, pitch_step as f32 * 9.8);
                assert_orthonormal(orientation.basis());
            }
        }
    }

    #[test]
    fn test_right_stays_horizontal() {
        let mut orientation = Orientation::new(13.0, 70.0, 0.1);
        orientation.apply_pointer_delta(350.0, -120.0);
        assert!(orientation.basis().right.y.abs() < EPSILON);
    }

    #[test]
    fn test_pitch_clamps_at_upper_limit() {
        let mut orientation = Orientation::new(0.0, 80.0, 1.0);
        orientation.apply_pointer_delta(0.0, 500.0);
        assert_eq!(orientation.pitch(), PITCH_LIMIT);
    }

    #[test]
    fn test_pitch_clamps_at_lower_limit() {
        let mut orientation = Orientation::new(0.0, -80.0, 1.0);
        orientation.apply_pointer_delta(0.0, -500.0);
        assert_eq!(orientation.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn test_sensitivity_scales_delta() {
        let mut orientation = Orientation::new(0.0, 0.0, 0.25);
        orientation.apply_pointer_delta(40.0, 8.0);
        assert!((orientation.yaw() - 10.0).abs() < EPSILON);
        assert!((orientation.pitch() - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_non_finite_delta_ignored() {
        let mut orientation = Orientation::default();
        let before = orientation.basis();
        orientation.apply_pointer_delta(f32::NAN, 1.0);
        orientation.apply_pointer_delta(1.0, f32::INFINITY);
        assert_eq!(orientation.basis(), before);
        assert_eq!(orientation.yaw(), DEFAULT_YAW);
    }

    #[test]
    fn test_negative_sensitivity_floors_at_zero() {
        let mut orientation = Orientation::new(0.0, 0.0, -3.0);
        assert_eq!(orientation.sensitivity(), 0.0);
        orientation.apply_pointer_delta(100.0, 100.0);
        assert_eq!(orientation.yaw(), 0.0);
    }
}
