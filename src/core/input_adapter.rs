use std::collections::HashSet;
use winit::event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};

/// Pixel-delta scrolls (touchpads) are converted to notches at this rate
const PIXELS_PER_SCROLL_STEP: f64 = 40.0;

/// Input gathered since the previous poll, handed to the frame step by value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Held buttons at the time of the poll
    pub down: Vec<Button>,
    /// Cursor position in window pixels, if any motion has been seen
    pub cursor: Option<(f64, f64)>,
    /// Accumulated wheel notches (positive = away from the user)
    pub scroll: f32,
    /// New framebuffer size if the window was resized
    pub resized: Option<(u32, u32)>,
    /// Focus returned to the window; the pointer must be re-seeded
    pub regained_focus: bool,
}

impl Controller for InputSnapshot {
    fn is_down(&self, button: Button) -> bool {
        self.down.contains(&button)
    }

    fn get_down_keys(&self) -> &[Button] {
        &self.down
    }
}

/// Adapter that bridges Winit events to the Controller trait
///
/// While the cursor is captured, winit reports raw `MouseMotion` deltas
/// rather than positions. Those are folded into a virtual cursor so
/// consumers always see an absolute position per poll.
#[derive(Debug, Clone)]
pub struct WinitController {
    pressed_keys: HashSet<Button>,
    pressed_vec: Vec<Button>,
    cursor: Option<(f64, f64)>,
    scroll: f32,
    resized: Option<(u32, u32)>,
    regained_focus: bool,
}

impl WinitController {
    /// Create a new WinitController with no pressed keys
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            pressed_vec: Vec::new(),
            cursor: None,
            scroll: 0.0,
            resized: None,
            regained_focus: false,
        }
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if let Some(button) = Self::keycode_to_button(keycode) {
                        self.set_button(button, event.state);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => {
                        (position.y / PIXELS_PER_SCROLL_STEP) as f32
                    }
                };
            }
            WindowEvent::Resized(size) => {
                self.resized = Some((size.width, size.height));
            }
            WindowEvent::Focused(focused) => {
                if *focused {
                    self.regained_focus = true;
                } else {
                    self.release_all();
                }
            }
            _ => {}
        }
    }

    /// Process a raw device event (relative mouse motion)
    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.move_cursor(*dx, *dy);
        }
    }

    /// Offset the virtual cursor by a relative motion
    pub fn move_cursor(&mut self, dx: f64, dy: f64) {
        let (x, y) = self.cursor.unwrap_or((0.0, 0.0));
        self.cursor = Some((x + dx, y + dy));
    }

    /// Collect this poll's input and reset per-poll state
    pub fn snapshot(&mut self) -> InputSnapshot {
        InputSnapshot {
            down: self.pressed_vec.clone(),
            cursor: self.cursor,
            scroll: std::mem::take(&mut self.scroll),
            resized: self.resized.take(),
            regained_focus: std::mem::take(&mut self.regained_focus),
        }
    }

    /// Get current cursor position (if available)
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    fn set_button(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.pressed_keys.insert(button) {
                    self.pressed_vec.push(button);
                }
            }
            ElementState::Released => {
                if self.pressed_keys.remove(&button) {
                    self.pressed_vec.retain(|&b| b != button);
                }
            }
        }
    }

    fn release_all(&mut self) {
        self.pressed_keys.clear();
        self.pressed_vec.clear();
    }

    /// Map Winit KeyCode to Button
    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::KeyW => Some(Button::KeyW),
            KeyCode::KeyA => Some(Button::KeyA),
            KeyCode::KeyS => Some(Button::KeyS),
            KeyCode::KeyD => Some(Button::KeyD),
            KeyCode::KeyQ => Some(Button::KeyQ),
            KeyCode::KeyE => Some(Button::KeyE),
            KeyCode::KeyR => Some(Button::KeyR),
            KeyCode::Digit1 => Some(Button::Digit1),
            KeyCode::Digit2 => Some(Button::Digit2),
            KeyCode::Digit3 => Some(Button::Digit3),
            KeyCode::Digit4 => Some(Button::Digit4),
            KeyCode::Digit5 => Some(Button::Digit5),
            KeyCode::Digit6 => Some(Button::Digit6),
            KeyCode::Space => Some(Button::Space),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Shift),
            KeyCode::Escape => Some(Button::Escape),
            _ => None,
        }
    }
}

impl Default for WinitController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn get_down_keys(&self) -> &[Button] {
        &self.pressed_vec
    }
}
