pub mod app;
pub mod camera;
pub mod cli;
pub mod core;
pub mod fractal;
pub mod params;
pub mod settings;
pub mod shaders;

pub use app::App;
pub use camera::Camera;
pub use params::RenderParameters;
pub use settings::Settings;
