use anyhow::{bail, Result};
use wgpu::util::DeviceExt;
use wgpu::{BindGroupLayout, Buffer, ComputePipeline, Device, Queue, RenderPipeline};

use super::uniforms::{UniformBlock, UniformValue};

/// CPU copy of a program's uniforms plus a dirty flag
#[derive(Debug, Clone, Default)]
pub struct UniformState<U: UniformBlock> {
    block: U,
    dirty: bool,
}

impl<U: UniformBlock> UniformState<U> {
    pub fn new(block: U) -> Self {
        Self { block, dirty: true }
    }

    /// Set a uniform by name; unknown names are silently skipped
    pub fn set(&mut self, program: &str, name: &str, value: UniformValue) {
        if self.block.set(name, value) {
            self.dirty = true;
        } else {
            log::trace!("{program}: no uniform named {name:?} accepting {value:?}");
        }
    }

    pub fn block(&self) -> &U {
        &self.block
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bytes to upload, if anything changed since the last call
    pub fn take_dirty(&mut self) -> Option<&[u8]> {
        if std::mem::take(&mut self.dirty) {
            Some(bytemuck::bytes_of(&self.block))
        } else {
            None
        }
    }
}

/// Compiled pipeline for one stage set
pub enum ProgramKind {
    Compute(ComputePipeline),
    Raster(RenderPipeline),
}

/// Raster stage description for [`ShaderProgram::raster`]
pub struct RasterTarget {
    pub format: wgpu::TextureFormat,
}

/// A compiled and linked shader program with name-addressable uniforms.
///
/// Creation captures WGSL validation errors in an error scope, so a bad
/// shader comes back as `Err` instead of a device panic.
pub struct ShaderProgram<U: UniformBlock> {
    label: String,
    kind: ProgramKind,
    layout: BindGroupLayout,
    uniforms: UniformState<U>,
    uniform_buffer: Buffer,
}

impl<U: UniformBlock + Default> ShaderProgram<U> {
    /// Compile a compute program with entry point `main`
    pub fn compute(
        device: &Device,
        label: &str,
        source: &str,
        layout_entries: &[wgpu::BindGroupLayoutEntry],
    ) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let layout = Self::create_layout(device, label, layout_entries);
        let pipeline_layout = Self::create_pipeline_layout(device, label, &layout);

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self::finish(device, label, ProgramKind::Compute(pipeline), layout)
    }

    /// Compile a raster program with entry points `vs_main` / `fs_main`
    pub fn raster(
        device: &Device,
        label: &str,
        source: &str,
        layout_entries: &[wgpu::BindGroupLayoutEntry],
        target: RasterTarget,
    ) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let layout = Self::create_layout(device, label, layout_entries);
        let pipeline_layout = Self::create_pipeline_layout(device, label, &layout);

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self::finish(device, label, ProgramKind::Raster(pipeline), layout)
    }

    fn finish(
        device: &Device,
        label: &str,
        kind: ProgramKind,
        layout: BindGroupLayout,
    ) -> Result<Self> {
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            bail!("Failed to build shader program {label:?}: {error}");
        }

        let uniforms = UniformState::new(U::default());
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Uniforms")),
            contents: bytemuck::bytes_of(uniforms.block()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        log::debug!("Shader program {label:?} ready");

        Ok(Self {
            label: label.to_string(),
            kind,
            layout,
            uniforms,
            uniform_buffer,
        })
    }

    fn create_layout(
        device: &Device,
        label: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
    ) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} Bind Group Layout")),
            entries,
        })
    }

    fn create_pipeline_layout(
        device: &Device,
        label: &str,
        layout: &BindGroupLayout,
    ) -> wgpu::PipelineLayout {
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} Pipeline Layout")),
            bind_group_layouts: &[layout],
            push_constant_ranges: &[],
        })
    }
}

impl<U: UniformBlock> ShaderProgram<U> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &ProgramKind {
        &self.kind
    }

    pub fn bind_group_layout(&self) -> &BindGroupLayout {
        &self.layout
    }

    pub fn uniform_buffer(&self) -> &Buffer {
        &self.uniform_buffer
    }

    pub fn uniforms(&self) -> &U {
        self.uniforms.block()
    }

    /// Set a uniform by name; a miss is a silent no-op
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.set(&self.label, name, value);
    }

    /// Write pending uniform changes into the GPU buffer
    pub fn upload(&mut self, queue: &Queue) {
        if let Some(bytes) = self.uniforms.take_dirty() {
            queue.write_buffer(&self.uniform_buffer, 0, bytes);
        }
    }
}

/// Uniform buffer entry at `binding` visible to `visibility`
pub fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
