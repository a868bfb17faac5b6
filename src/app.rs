use std::sync::Arc;

use anyhow::{Context, Result};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::camera::{Camera, MovementState, PointerTracker};
use crate::core::clock::{Clock, FpsCounter};
use crate::core::controller::{Button, Controller};
use crate::core::gpu_context::GpuContext;
use crate::core::input_adapter::{InputSnapshot, WinitController};
use crate::core::renderer::Renderer;
use crate::fractal::{self, Mandelbulb};
use crate::params::{Controls, RenderParameters};
use crate::settings::Settings;

const WINDOW_TITLE: &str = "Mandelbulb Explorer";

/// Owns all frame state; winit drives it through [`ApplicationHandler`]
pub struct App {
    settings: Settings,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    input: WinitController,
    pointer: PointerTracker,
    controls: Controls,
    camera: Camera,
    params: RenderParameters,
    clock: Clock,
    fps: FpsCounter,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            camera: settings.camera(),
            params: settings.parameters(),
            settings,
            window: None,
            renderer: None,
            input: WinitController::new(),
            pointer: PointerTracker::new(),
            controls: Controls::new(),
            clock: Clock::new(),
            fps: FpsCounter::default(),
            error: None,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn params(&self) -> &RenderParameters {
        &self.params
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(WINDOW_TITLE)
                    .with_inner_size(winit::dpi::PhysicalSize::new(
                        self.settings.width,
                        self.settings.height,
                    )),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);

        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        let size = window.inner_size();
        let renderer = Renderer::new(gpu, size.width, size.height, self.settings.strategy)?;

        self.params.set_resolution(size.width, size.height);
        capture_cursor(&window);

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.clock.reset();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    /// Surface distance for adaptive speed, in world units
    fn surface_distance(&self) -> Option<f64> {
        if !self.settings.adaptive_speed {
            return None;
        }

        let bulb = Mandelbulb {
            power: self.params.power as f64,
            bailout: self.params.bailout as f64,
            ..Default::default()
        };
        let mut position = self.camera.world_position();
        if self.params.auto_rotate {
            position = fractal::rotate_y(
                position,
                self.params.elapsed as f64 * fractal::ROTATE_SPEED,
            );
        }
        Some(bulb.distance(position))
    }

    /// Fold one input snapshot into camera and parameters
    fn update(&mut self, input: &InputSnapshot, dt: f32) {
        if input.regained_focus {
            self.pointer.reset();
            if let Some(window) = &self.window {
                capture_cursor(window);
            }
        }

        if let Some((x, y)) = input.cursor {
            if let Some((dx, dy)) = self.pointer.sample(x, y) {
                self.camera.look(dx, dy);
            }
        }

        self.controls
            .update(input, &mut self.params, &mut self.camera);

        if input.scroll != 0.0 {
            self.camera.scroll(input.scroll);
            log::info!("Speed: {:.3e}", self.camera.envelope().speed());
        }

        let speed = self.camera.effective_speed(self.surface_distance());
        self.camera
            .step(MovementState::from_controller(input), dt, speed);
        self.params.advance(dt);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.tick();
        let input = self.input.snapshot();

        if let Some((width, height)) = input.resized {
            self.params.set_resolution(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(width, height);
            }
        }

        self.update(&input, dt);

        let Some(renderer) = &mut self.renderer else {
            return;
        };

        match renderer.render_frame(&self.camera, &self.params) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout, frame skipped"),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow::anyhow!("GPU out of memory"));
                return;
            }
            Err(error) => log::warn!("Frame skipped: {error}"),
        }

        if let Some(fps) = self.fps.frame(dt) {
            log::info!(
                "FPS: {fps:.1} | pos {:.4?} | exponent {}",
                self.camera.world_position(),
                self.camera.exponent()
            );
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(error) = self.init(event_loop) {
            self.fail(event_loop, error.context("Initialization failed"));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.input.process_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { .. } if self.input.is_down(Button::Escape) => {
                event_loop.exit()
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        self.input.process_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Hide the cursor and keep it in the window for mouse look
fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(error) = grabbed {
        log::warn!("Cursor grab unavailable: {error}");
    }
    window.set_cursor_visible(false);
}

/// Open the window and run the frame loop until exit
pub fn run(settings: Settings) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings);
    event_loop
        .run_app(&mut app)
        .context("Event loop terminated abnormally")?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
