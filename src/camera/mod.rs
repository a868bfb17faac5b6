pub mod envelope;
pub mod orientation;
pub mod pointer;
pub mod position;

pub use envelope::MovementEnvelope;
pub use orientation::{Basis, Orientation};
pub use pointer::PointerTracker;
pub use position::FloatingOrigin;

use glam::DVec3;

use crate::core::controller::{Button, Controller};

pub const DEFAULT_POSITION: DVec3 = DVec3::new(0.0, 0.0, -4.0);
/// Fraction of the surface distance the camera may cover per second
pub const ADAPTIVE_SPEED_FACTOR: f64 = 0.2;

/// Held movement keys for one frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovementState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MovementState {
    pub fn from_controller(controller: &dyn Controller) -> Self {
        Self {
            forward: controller.is_down(Button::KeyW),
            backward: controller.is_down(Button::KeyS),
            left: controller.is_down(Button::KeyA),
            right: controller.is_down(Button::KeyD),
            up: controller.is_down(Button::Space),
            down: controller.is_down(Button::Shift),
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Explicit zoom request: scales the camera position by a power of two
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zoom {
    In,
    Out,
}

impl Zoom {
    const fn exponent_step(self) -> i32 {
        match self {
            Zoom::In => -1,
            Zoom::Out => 1,
        }
    }
}

/// First-person camera: orientation, floating-origin position and speed
#[derive(Debug, Clone)]
pub struct Camera {
    orientation: Orientation,
    position: FloatingOrigin,
    envelope: MovementEnvelope,
}

impl Camera {
    pub fn new(position: DVec3, orientation: Orientation, envelope: MovementEnvelope) -> Self {
        Self {
            orientation,
            position: FloatingOrigin::new(position),
            envelope,
        }
    }

    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    pub fn orientation_mut(&mut self) -> &mut Orientation {
        &mut self.orientation
    }

    pub fn envelope(&self) -> &MovementEnvelope {
        &self.envelope
    }

    pub fn envelope_mut(&mut self) -> &mut MovementEnvelope {
        &mut self.envelope
    }

    pub fn basis(&self) -> Basis {
        self.orientation.basis()
    }

    pub fn world_position(&self) -> DVec3 {
        self.position.world_position()
    }

    /// `2^exponent` of the floating origin, used by the shader for hit precision
    pub fn scale(&self) -> f64 {
        self.position.scale()
    }

    pub fn exponent(&self) -> i32 {
        self.position.exponent()
    }

    pub fn look(&mut self, dx: f32, dy: f32) {
        self.orientation.apply_pointer_delta(dx, dy);
    }

    /// Mantissa speed for this frame.
    ///
    /// With a surface distance the camera is slowed to
    /// `ADAPTIVE_SPEED_FACTOR * distance` world units per second, never below
    /// the envelope minimum or above the envelope speed.
    pub fn effective_speed(&self, surface_distance: Option<f64>) -> f64 {
        let speed = self.envelope.speed();
        match surface_distance {
            Some(distance) if distance.is_finite() && distance > 0.0 => {
                let adaptive = distance * ADAPTIVE_SPEED_FACTOR / self.scale();
                adaptive.min(speed).max(self.envelope.min_speed())
            }
            _ => speed,
        }
    }

    /// Move along every held direction, then renormalize once
    pub fn step(&mut self, movement: MovementState, dt: f32, speed: f64) {
        if movement.is_idle() || dt <= 0.0 {
            return;
        }

        let basis = self.basis();
        let forward = basis.forward.as_dvec3();
        let right = basis.right.as_dvec3();
        let up = basis.up.as_dvec3();
        let dt = dt as f64;

        let held = [
            (movement.forward, forward),
            (movement.backward, -forward),
            (movement.right, right),
            (movement.left, -right),
            (movement.up, up),
            (movement.down, -up),
        ];

        for (_, direction) in held.iter().filter(|(pressed, _)| *pressed) {
            self.position.translate(*direction, speed, dt);
        }

        let delta = self.position.renormalize();
        self.envelope.rescale_for_exponent(delta);
    }

    /// Single displacement along an arbitrary direction, renormalized
    pub fn translate(&mut self, direction: DVec3, speed: f64, dt: f64) {
        self.position.translate(direction, speed, dt);
        let delta = self.position.renormalize();
        self.envelope.rescale_for_exponent(delta);
    }

    pub fn zoom(&mut self, zoom: Zoom) {
        let step = zoom.exponent_step();
        self.position.zoom(step);
        self.envelope.rescale_for_exponent(step);
    }

    pub fn scroll(&mut self, steps: f32) {
        self.envelope.scroll(steps);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            DEFAULT_POSITION,
            Orientation::default(),
            MovementEnvelope::default(),
        )
    }
}
