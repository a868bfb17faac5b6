/// Frame uniform block shared by every fractal shader (`FrameUniforms` in WGSL)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub cam_pos: [f32; 3],
    pub time: f32,
    pub cam_forward: [f32; 3],
    pub fov: f32,
    pub cam_right: [f32; 3],
    pub scale: f32,
    pub cam_up: [f32; 3],
    pub power: f32,
    pub resolution: [f32; 2],
    pub bailout: f32,
    pub max_iterations: i32,
    pub auto_rotate: u32,
    pub lod: f32,
    pub _pad: [f32; 2],
}

/// A value accepted by [`UniformBlock::set`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Bool(bool),
}

/// Name-addressable uniform storage for one shader program.
///
/// Mirrors uniform-location semantics: a name the program does not declare,
/// or a value of the wrong kind, is ignored rather than reported.
pub trait UniformBlock: bytemuck::Pod {
    /// Write `value` into the field called `name`; returns false on a miss
    fn set(&mut self, name: &str, value: UniformValue) -> bool;
}

impl UniformBlock for FrameUniforms {
    fn set(&mut self, name: &str, value: UniformValue) -> bool {
        use UniformValue::*;

        match (name, value) {
            ("cam_pos", Vec3(v)) => self.cam_pos = v,
            ("cam_forward", Vec3(v)) => self.cam_forward = v,
            ("cam_right", Vec3(v)) => self.cam_right = v,
            ("cam_up", Vec3(v)) => self.cam_up = v,
            ("resolution", Vec2(v)) => self.resolution = v,
            ("time", Float(v)) => self.time = v,
            ("fov", Float(v)) => self.fov = v,
            ("scale", Float(v)) => self.scale = v,
            ("power", Float(v)) => self.power = v,
            ("bailout", Float(v)) => self.bailout = v,
            ("lod", Float(v)) => self.lod = v,
            ("max_iterations", Int(v)) => self.max_iterations = v,
            ("auto_rotate", Bool(v)) => self.auto_rotate = v as u32,
            ("auto_rotate", Int(v)) => self.auto_rotate = (v != 0) as u32,
            _ => return false,
        }
        true
    }
}

/// Programs without uniforms (the blit pass) use the unit block
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NoUniforms {
    _pad: [u32; 4],
}

impl UniformBlock for NoUniforms {
    fn set(&mut self, _name: &str, _value: UniformValue) -> bool {
        false
    }
}
