pub mod clock;
pub mod controller;
pub mod dispatch;
pub mod display_context;
pub mod gpu_context;
pub mod input_adapter;
pub mod renderer;
pub mod shader_program;
pub mod uniforms;
