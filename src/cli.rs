// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::core::dispatch::StrategyChoice;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mandelbulb-flight")]
#[command(about = "Real-time Mandelbulb fly-through", long_about = None)]
pub struct Cli {
    /// JSON settings file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Initial window width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Rendering strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyChoice>,

    /// Mouse look sensitivity in degrees per pixel
    #[arg(long)]
    pub sensitivity: Option<f32>,

    /// Slow the camera down near the fractal surface
    #[arg(long)]
    pub adaptive_speed: bool,
}
