use crate::camera::{Camera, Zoom};
use crate::core::controller::{Button, Controller};

use super::{RenderParameters, BAILOUT_STEP, ITERATION_STEP, POWER_STEP};

/// Remembers whether a key was down on the previous poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyLatch {
    was_down: bool,
}

impl KeyLatch {
    /// Returns true only on the released -> pressed transition
    pub fn poll(&mut self, down: bool) -> bool {
        let fired = down && !self.was_down;
        self.was_down = down;
        fired
    }
}

/// A discrete action fired by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    FewerIterations,
    MoreIterations,
    LowerPower,
    HigherPower,
    LowerBailout,
    HigherBailout,
    ToggleAutoRotate,
    ZoomOut,
    ZoomIn,
}

impl ControlEvent {
    /// Apply to the frame state; saturates silently at parameter bounds
    pub fn apply(self, params: &mut RenderParameters, camera: &mut Camera) {
        match self {
            ControlEvent::FewerIterations => params.bump_iterations(-ITERATION_STEP),
            ControlEvent::MoreIterations => params.bump_iterations(ITERATION_STEP),
            ControlEvent::LowerPower => params.bump_power(-POWER_STEP),
            ControlEvent::HigherPower => params.bump_power(POWER_STEP),
            ControlEvent::LowerBailout => params.bump_bailout(-BAILOUT_STEP),
            ControlEvent::HigherBailout => params.bump_bailout(BAILOUT_STEP),
            ControlEvent::ToggleAutoRotate => params.toggle_auto_rotate(),
            ControlEvent::ZoomOut => camera.zoom(Zoom::Out),
            ControlEvent::ZoomIn => camera.zoom(Zoom::In),
        }
    }
}

const BINDINGS: [(Button, ControlEvent); 9] = [
    (Button::Digit1, ControlEvent::FewerIterations),
    (Button::Digit2, ControlEvent::MoreIterations),
    (Button::Digit3, ControlEvent::LowerPower),
    (Button::Digit4, ControlEvent::HigherPower),
    (Button::Digit5, ControlEvent::LowerBailout),
    (Button::Digit6, ControlEvent::HigherBailout),
    (Button::KeyR, ControlEvent::ToggleAutoRotate),
    (Button::KeyQ, ControlEvent::ZoomOut),
    (Button::KeyE, ControlEvent::ZoomIn),
];

/// Edge-triggered key bindings for the parameter set
#[derive(Debug, Clone, Default)]
pub struct Controls {
    latches: [KeyLatch; BINDINGS.len()],
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events whose key went down since the previous poll, in binding order
    pub fn poll(&mut self, controller: &dyn Controller) -> Vec<ControlEvent> {
        BINDINGS
            .iter()
            .zip(self.latches.iter_mut())
            .filter_map(|((button, event), latch)| {
                latch.poll(controller.is_down(*button)).then_some(*event)
            })
            .collect()
    }

    /// Poll, apply and log every fired control
    pub fn update(
        &mut self,
        controller: &dyn Controller,
        params: &mut RenderParameters,
        camera: &mut Camera,
    ) -> Vec<ControlEvent> {
        let events = self.poll(controller);
        for event in &events {
            event.apply(params, camera);
            log_event(*event, params, camera);
        }
        events
    }

    /// Key help, printed once at startup
    pub fn help() -> &'static [&'static str] {
        &[
            "WASD - Move horizontally",
            "Space/Shift - Move up/down",
            "Mouse - Look around",
            "Scroll - Adjust speed",
            "1/2 - Decrease/Increase iterations",
            "3/4 - Decrease/Increase power",
            "5/6 - Decrease/Increase bailout",
            "Q/E - Zoom out/in",
            "R - Toggle auto-rotate",
            "ESC - Exit",
        ]
    }
}

fn log_event(event: ControlEvent, params: &RenderParameters, camera: &Camera) {
    match event {
        ControlEvent::FewerIterations | ControlEvent::MoreIterations => {
            log::info!("Max iterations: {}", params.max_iterations)
        }
        ControlEvent::LowerPower | ControlEvent::HigherPower => {
            log::info!("Power: {}", params.power)
        }
        ControlEvent::LowerBailout | ControlEvent::HigherBailout => {
            log::info!("Bailout: {}", params.bailout)
        }
        ControlEvent::ToggleAutoRotate => {
            log::info!("Auto-rotate: {}", if params.auto_rotate { "ON" } else { "OFF" })
        }
        ControlEvent::ZoomOut | ControlEvent::ZoomIn => log::info!(
            "Zoom exponent: {} (speed {:.3e})",
            camera.exponent(),
            camera.envelope().speed()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Keys(Vec<Button>);

    impl Controller for Keys {
        fn is_down(&self, button: Button) -> bool {
            self.0.contains(&button)
        }

        fn get_down_keys(&self) -> &[Button] {
            &self.0
        }
    }

    #[test]
    fn test_latch_fires_on_press_only() {
        let mut latch = KeyLatch::default();
        assert!(!latch.poll(false));
        assert!(latch.poll(true));
        assert!(!latch.poll(true));
        assert!(!latch.poll(false));
        assert!(latch.poll(true));
    }

    #[test]
    fn test_held_key_fires_once() {
        let mut controls = Controls::new();
        let held = Keys(vec![Button::KeyR]);

        let fired: usize = (0..30).map(|_| controls.poll(&held).len()).sum();
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_simultaneous_keys_fire_in_binding_order() {
        let mut controls = Controls::new();
        let keys = Keys(vec![Button::KeyE, Button::Digit1]);
        assert_eq!(
            controls.poll(&keys),
            vec![ControlEvent::FewerIterations, ControlEvent::ZoomIn]
        );
    }

    #[test]
    fn test_movement_keys_not_bound() {
        let mut controls = Controls::new();
        let keys = Keys(vec![Button::KeyW, Button::Space, Button::Escape]);
        assert!(controls.poll(&keys).is_empty());
    }
}
