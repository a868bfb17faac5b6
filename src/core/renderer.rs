use anyhow::{Context, Result};
use wgpu::{BindGroup, CommandEncoder, Device, Sampler, SurfaceConfiguration, TextureView};

use super::dispatch::{
    push_frame_uniforms, FramePlan, GpuCommand, Program, Strategy, StrategyChoice, QUAD_VERTICES,
};
use super::display_context::DisplayContext;
use super::gpu_context::GpuContext;
use super::shader_program::{uniform_entry, ProgramKind, RasterTarget, ShaderProgram};
use super::uniforms::{FrameUniforms, NoUniforms};
use crate::camera::Camera;
use crate::params::RenderParameters;
use crate::shaders;

const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Per-strategy GPU resources
enum Stage {
    Compute {
        blit: ShaderProgram<NoUniforms>,
        sampler: Sampler,
        write_group: BindGroup,
        read_group: BindGroup,
    },
    Direct {
        uniform_group: BindGroup,
    },
}

/// Draws the fractal into the window surface, one [`FramePlan`] per frame
pub struct Renderer {
    gpu: GpuContext,
    config: SurfaceConfiguration,
    strategy: Strategy,
    fractal: ShaderProgram<FrameUniforms>,
    stage: Stage,
    target: DisplayContext,
}

impl Renderer {
    /// Pick the strategy, compile its programs and configure the surface.
    ///
    /// Any shader validation failure aborts creation.
    pub fn new(gpu: GpuContext, width: u32, height: u32, choice: StrategyChoice) -> Result<Self> {
        let strategy = choice.resolve(gpu.supports_compute())?;
        log::info!("Render strategy: {strategy} (requested {choice:?})");

        let config = gpu.surface_config(width.max(1), height.max(1))?;
        let target = DisplayContext::new(width, height);
        if !target.is_empty() {
            gpu.surface().configure(gpu.device(), &config);
        }

        let device = gpu.device();
        let (fractal, stage) = match strategy {
            Strategy::Compute => {
                let fractal = ShaderProgram::compute(
                    device,
                    "Fractal Compute",
                    shaders::FRACTAL_COMPUTE,
                    &[uniform_entry(0, wgpu::ShaderStages::COMPUTE), storage_entry(1)],
                )
                .context("Failed to build compute strategy")?;
                let blit = ShaderProgram::raster(
                    device,
                    "Blit",
                    shaders::DISPLAY,
                    &display_entries(),
                    RasterTarget {
                        format: config.format,
                    },
                )
                .context("Failed to build compute strategy")?;

                let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                    label: Some("Output Sampler"),
                    mag_filter: wgpu::FilterMode::Linear,
                    min_filter: wgpu::FilterMode::Linear,
                    ..Default::default()
                });
                let (write_group, read_group) =
                    create_output(device, &fractal, &blit, &sampler, config.width, config.height);

                let stage = Stage::Compute {
                    blit,
                    sampler,
                    write_group,
                    read_group,
                };
                (fractal, stage)
            }
            Strategy::Direct => {
                let fractal = ShaderProgram::raster(
                    device,
                    "Fractal Direct",
                    shaders::FRACTAL_DIRECT,
                    &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
                    RasterTarget {
                        format: config.format,
                    },
                )
                .context("Failed to build direct strategy")?;
                let uniform_group = create_uniform_group(device, &fractal);
                (fractal, Stage::Direct { uniform_group })
            }
        };

        Ok(Self {
            gpu,
            config,
            strategy,
            fractal,
            stage,
            target,
        })
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn target(&self) -> DisplayContext {
        self.target
    }

    /// Track a new framebuffer size; zero sizes only pause rendering
    pub fn resize(&mut self, width: u32, height: u32) {
        self.target = DisplayContext::new(width, height);
        if self.target.is_empty() {
            log::debug!("Framebuffer is {width}x{height}, pausing");
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.reconfigure();

        if let Stage::Compute {
            blit,
            sampler,
            write_group,
            read_group,
        } = &mut self.stage
        {
            let (write, read) =
                create_output(self.gpu.device(), &self.fractal, blit, sampler, width, height);
            *write_group = write;
            *read_group = read;
        }

        log::info!("Resized to {width}x{height}");
    }

    /// Re-apply the surface configuration after `Lost` / `Outdated`
    pub fn reconfigure(&self) {
        if !self.target.is_empty() {
            self.gpu.surface().configure(self.gpu.device(), &self.config);
        }
    }

    /// Render and present one frame
    pub fn render_frame(
        &mut self,
        camera: &Camera,
        params: &RenderParameters,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let plan = FramePlan::build(self.strategy, self.target);
        if plan.is_empty() {
            return Ok(());
        }

        push_frame_uniforms(&mut self.fractal, camera, params);

        let frame = self.gpu.surface().get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.execute(&plan, &mut encoder, &view);

        self.gpu.queue().submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn execute(&mut self, plan: &FramePlan, encoder: &mut CommandEncoder, view: &TextureView) {
        let mut passes = Passes::default();

        for command in plan.commands() {
            match *command {
                GpuCommand::UploadUniforms(Program::Fractal) => {
                    self.fractal.upload(self.gpu.queue())
                }
                GpuCommand::UploadUniforms(Program::Blit) => {
                    if let Stage::Compute { blit, .. } = &mut self.stage {
                        blit.upload(self.gpu.queue());
                    }
                }
                GpuCommand::UseProgram(program) => {
                    let kind = match (program, &self.stage) {
                        (Program::Fractal, _) => self.fractal.kind(),
                        (Program::Blit, Stage::Compute { blit, .. }) => blit.kind(),
                        (Program::Blit, Stage::Direct { .. }) => {
                            log::warn!("Blit program used without a compute stage");
                            continue;
                        }
                    };
                    match kind {
                        ProgramKind::Compute(pipeline) => {
                            passes.compute(encoder).set_pipeline(pipeline)
                        }
                        ProgramKind::Raster(pipeline) => {
                            passes.render(encoder, view, None).set_pipeline(pipeline)
                        }
                    }
                }
                GpuCommand::BindOutputForWrite => {
                    if let Stage::Compute { write_group, .. } = &self.stage {
                        passes.compute(encoder).set_bind_group(0, write_group, &[]);
                    }
                }
                GpuCommand::Dispatch { x, y, z } => {
                    passes.compute(encoder).dispatch_workgroups(x, y, z)
                }
                GpuCommand::MemoryBarrier => passes.end_compute(),
                GpuCommand::ClearTarget => {
                    passes.end_render();
                    passes.render(encoder, view, Some(CLEAR_COLOR));
                }
                GpuCommand::BindOutputForRead => {
                    if let Stage::Compute { read_group, .. } = &self.stage {
                        passes.render(encoder, view, None).set_bind_group(0, read_group, &[]);
                    }
                }
                GpuCommand::BindUniforms => {
                    if let Stage::Direct { uniform_group } = &self.stage {
                        passes
                            .render(encoder, view, None)
                            .set_bind_group(0, uniform_group, &[]);
                    }
                }
                GpuCommand::DrawFullscreenQuad => {
                    passes.render(encoder, view, None).draw(0..QUAD_VERTICES, 0..1)
                }
            }
        }
    }
}

/// Open passes while a plan executes.
///
/// At most one pass is open at a time; ending the compute pass before the
/// render pass begins is what orders image writes before sampling.
#[derive(Default)]
struct Passes {
    compute: Option<wgpu::ComputePass<'static>>,
    render: Option<wgpu::RenderPass<'static>>,
}

impl Passes {
    fn compute(&mut self, encoder: &mut CommandEncoder) -> &mut wgpu::ComputePass<'static> {
        self.end_render();
        self.compute.get_or_insert_with(|| {
            encoder
                .begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Fractal Compute Pass"),
                    timestamp_writes: None,
                })
                .forget_lifetime()
        })
    }

    fn render(
        &mut self,
        encoder: &mut CommandEncoder,
        view: &TextureView,
        clear: Option<wgpu::Color>,
    ) -> &mut wgpu::RenderPass<'static> {
        self.end_compute();
        self.render.get_or_insert_with(|| {
            let load = clear.map_or(wgpu::LoadOp::Load, wgpu::LoadOp::Clear);
            encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Display Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime()
        })
    }

    fn end_compute(&mut self) {
        self.compute = None;
    }

    fn end_render(&mut self) {
        self.render = None;
    }
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::StorageTexture {
            access: wgpu::StorageTextureAccess::WriteOnly,
            format: OUTPUT_FORMAT,
            view_dimension: wgpu::TextureViewDimension::D2,
        },
        count: None,
    }
}

fn display_entries() -> [wgpu::BindGroupLayoutEntry; 2] {
    [
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}

fn create_uniform_group(device: &Device, program: &ShaderProgram<FrameUniforms>) -> BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Fractal Uniform Bind Group"),
        layout: program.bind_group_layout(),
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: program.uniform_buffer().as_entire_binding(),
        }],
    })
}

/// Fresh output image, returned as the bind groups that write and sample it
fn create_output(
    device: &Device,
    fractal: &ShaderProgram<FrameUniforms>,
    blit: &ShaderProgram<NoUniforms>,
    sampler: &Sampler,
    width: u32,
    height: u32,
) -> (BindGroup, BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Fractal Output Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: OUTPUT_FORMAT,
        usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let write_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Fractal Write Bind Group"),
        layout: fractal.bind_group_layout(),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: fractal.uniform_buffer().as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&view),
            },
        ],
    });

    let read_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Blit Read Bind Group"),
        layout: blit.bind_group_layout(),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    (write_group, read_group)
}
