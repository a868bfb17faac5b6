use std::fmt;

use serde::{Deserialize, Serialize};

use super::display_context::DisplayContext;
use super::shader_program::{ShaderProgram, UniformState};
use super::uniforms::{UniformBlock, UniformValue};
use crate::camera::Camera;
use crate::params::RenderParameters;

/// Work-group tile size of `fractal_compute.wgsl`
pub const TILE_SIZE: (u32, u32) = (8, 8);

/// Vertices of the two-triangle fullscreen quad
pub const QUAD_VERTICES: u32 = 6;

/// How a frame gets onto the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Compute pass writes an image, a blit pass presents it
    Compute,
    /// A fragment shader raymarches every pixel directly
    Direct,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Compute => write!(f, "compute"),
            Strategy::Direct => write!(f, "direct"),
        }
    }
}

/// Strategy requested on the command line or in the config file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    #[default]
    Auto,
    Compute,
    Direct,
}

impl StrategyChoice {
    /// Pick the concrete strategy once, at startup
    pub fn resolve(self, supports_compute: bool) -> anyhow::Result<Strategy> {
        match (self, supports_compute) {
            (StrategyChoice::Auto, true) | (StrategyChoice::Compute, true) => Ok(Strategy::Compute),
            (StrategyChoice::Auto, false) | (StrategyChoice::Direct, _) => Ok(Strategy::Direct),
            (StrategyChoice::Compute, false) => {
                anyhow::bail!("Compute strategy requested but the adapter lacks compute shaders")
            }
        }
    }
}

/// Programs the renderer knows how to bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    Fractal,
    Blit,
}

/// One step of a frame, in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuCommand {
    UploadUniforms(Program),
    UseProgram(Program),
    /// Bind the output image as a write-only storage texture
    BindOutputForWrite,
    Dispatch { x: u32, y: u32, z: u32 },
    /// Image writes from the dispatch become visible to later sampling
    MemoryBarrier,
    ClearTarget,
    /// Bind the output image and its sampler for the blit pass
    BindOutputForRead,
    /// Bind the fractal uniforms for the direct pass
    BindUniforms,
    DrawFullscreenQuad,
}

/// GPU-free ordered command list for one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramePlan {
    commands: Vec<GpuCommand>,
}

impl FramePlan {
    pub fn build(strategy: Strategy, target: DisplayContext) -> Self {
        if target.is_empty() {
            return Self::default();
        }

        let commands = match strategy {
            Strategy::Compute => {
                let (x, y) = target.workgroups(TILE_SIZE);
                vec![
                    GpuCommand::UploadUniforms(Program::Fractal),
                    GpuCommand::UseProgram(Program::Fractal),
                    GpuCommand::BindOutputForWrite,
                    GpuCommand::Dispatch { x, y, z: 1 },
                    GpuCommand::MemoryBarrier,
                    GpuCommand::ClearTarget,
                    GpuCommand::UseProgram(Program::Blit),
                    GpuCommand::BindOutputForRead,
                    GpuCommand::DrawFullscreenQuad,
                ]
            }
            Strategy::Direct => vec![
                GpuCommand::UploadUniforms(Program::Fractal),
                GpuCommand::ClearTarget,
                GpuCommand::UseProgram(Program::Fractal),
                GpuCommand::BindUniforms,
                GpuCommand::DrawFullscreenQuad,
            ],
        };

        Self { commands }
    }

    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn position(&self, command: GpuCommand) -> Option<usize> {
        self.commands.iter().position(|c| *c == command)
    }

    /// True when every dispatch is followed by a barrier before any draw
    pub fn is_ordered(&self) -> bool {
        let mut pending_dispatch = false;
        for command in &self.commands {
            match command {
                GpuCommand::Dispatch { .. } => pending_dispatch = true,
                GpuCommand::MemoryBarrier => pending_dispatch = false,
                GpuCommand::DrawFullscreenQuad if pending_dispatch => return false,
                _ => {}
            }
        }
        !pending_dispatch
    }

    /// Index of the barrier, if the plan has one
    pub fn barrier_index(&self) -> Option<usize> {
        self.position(GpuCommand::MemoryBarrier)
    }
}

/// Anything that accepts name-addressed uniforms
pub trait UniformSink {
    fn set_uniform(&mut self, name: &str, value: UniformValue);
}

impl<U: UniformBlock> UniformSink for UniformState<U> {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.set("frame", name, value);
    }
}

impl<U: UniformBlock> UniformSink for ShaderProgram<U> {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        ShaderProgram::set_uniform(self, name, value);
    }
}

/// Write the camera and the whole parameter set into `sink` by name
pub fn push_frame_uniforms(sink: &mut dyn UniformSink, camera: &Camera, params: &RenderParameters) {
    let basis = camera.basis();
    let position = camera.world_position().as_vec3();
    let (width, height) = params.resolution;

    sink.set_uniform("cam_pos", UniformValue::Vec3(position.to_array()));
    sink.set_uniform("cam_forward", UniformValue::Vec3(basis.forward.to_array()));
    sink.set_uniform("cam_right", UniformValue::Vec3(basis.right.to_array()));
    sink.set_uniform("cam_up", UniformValue::Vec3(basis.up.to_array()));
    sink.set_uniform("time", UniformValue::Float(params.elapsed));
    sink.set_uniform("fov", UniformValue::Float(params.fov));
    sink.set_uniform("scale", UniformValue::Float(camera.scale() as f32));
    sink.set_uniform("power", UniformValue::Float(params.power));
    sink.set_uniform(
        "resolution",
        UniformValue::Vec2([width as f32, height as f32]),
    );
    sink.set_uniform("bailout", UniformValue::Float(params.bailout));
    sink.set_uniform("max_iterations", UniformValue::Int(params.max_iterations));
    sink.set_uniform("auto_rotate", UniformValue::Bool(params.auto_rotate));
    sink.set_uniform("lod", UniformValue::Float(params.lod));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::uniforms::FrameUniforms;

    #[test]
    fn test_compute_plan_grid_for_720p() {
        let plan = FramePlan::build(Strategy::Compute, DisplayContext::new(1280, 720));
        assert!(plan
            .commands()
            .contains(&GpuCommand::Dispatch { x: 160, y: 90, z: 1 }));
    }

    #[test]
    fn test_compute_plan_barrier_between_dispatch_and_draw() {
        let plan = FramePlan::build(Strategy::Compute, DisplayContext::new(800, 600));
        let dispatch = plan
            .commands()
            .iter()
            .position(|c| matches!(c, GpuCommand::Dispatch { .. }));
        let barrier = plan.barrier_index();
        let draw = plan.position(GpuCommand::DrawFullscreenQuad);

        assert!(dispatch < barrier);
        assert!(barrier < draw);
        assert!(plan.is_ordered());
    }

    #[test]
    fn test_direct_plan_has_no_dispatch() {
        let plan = FramePlan::build(Strategy::Direct, DisplayContext::new(800, 600));
        assert!(plan.barrier_index().is_none());
        assert!(!plan
            .commands()
            .iter()
            .any(|c| matches!(c, GpuCommand::Dispatch { .. })));
        assert_eq!(plan.commands().last(), Some(&GpuCommand::DrawFullscreenQuad));
    }

    #[test]
    fn test_zero_size_plan_is_empty() {
        for strategy in [Strategy::Compute, Strategy::Direct] {
            assert!(FramePlan::build(strategy, DisplayContext::new(0, 600)).is_empty());
            assert!(FramePlan::build(strategy, DisplayContext::new(800, 0)).is_empty());
        }
    }

    #[test]
    fn test_unordered_plan_detected() {
        let plan = FramePlan {
            commands: vec![
                GpuCommand::Dispatch { x: 1, y: 1, z: 1 },
                GpuCommand::DrawFullscreenQuad,
            ],
        };
        assert!(!plan.is_ordered());
    }

    #[test]
    fn test_strategy_resolution() {
        assert_eq!(StrategyChoice::Auto.resolve(true).unwrap(), Strategy::Compute);
        assert_eq!(StrategyChoice::Auto.resolve(false).unwrap(), Strategy::Direct);
        assert_eq!(StrategyChoice::Direct.resolve(true).unwrap(), Strategy::Direct);
        assert!(StrategyChoice::Compute.resolve(false).is_err());
    }

    #[test]
    fn test_push_frame_uniforms_fills_block() {
        let camera = Camera::default();
        let mut params = RenderParameters::new(640, 480);
        params.toggle_auto_rotate();

        let mut state = UniformState::new(FrameUniforms::default());
        push_frame_uniforms(&mut state, &camera, &params);

        let block = state.block();
        assert_eq!(block.cam_pos, [0.0, 0.0, -4.0]);
        assert_eq!(block.resolution, [640.0, 480.0]);
        assert_eq!(block.max_iterations, 128);
        assert_eq!(block.power, 8.0);
        assert_eq!(block.bailout, 2.0);
        assert_eq!(block.auto_rotate, 1);
        assert_eq!(block.fov, 45.0);
        assert_eq!(block.scale, camera.scale() as f32);
        assert!((block.cam_forward[2] - 1.0).abs() < 1e-6);
    }
}
