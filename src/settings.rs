use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::camera::envelope::{DEFAULT_MAX_SPEED, DEFAULT_MIN_SPEED, DEFAULT_SPEED};
use crate::camera::orientation::DEFAULT_SENSITIVITY;
use crate::camera::{Camera, MovementEnvelope, Orientation};
use crate::cli::Cli;
use crate::core::dispatch::StrategyChoice;
use crate::params::{RenderParameters, DEFAULT_BAILOUT, DEFAULT_MAX_ITERATIONS, DEFAULT_POWER};

/// Startup configuration: JSON file values, then command-line overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub strategy: StrategyChoice,
    pub sensitivity: f32,
    pub speed: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Rescale speed with the floating-origin exponent
    pub depth_compensation: bool,
    pub adaptive_speed: bool,
    pub start_position: [f64; 3],
    pub max_iterations: i32,
    pub power: f32,
    pub bailout: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            strategy: StrategyChoice::Auto,
            sensitivity: DEFAULT_SENSITIVITY,
            speed: DEFAULT_SPEED,
            min_speed: DEFAULT_MIN_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            depth_compensation: true,
            adaptive_speed: false,
            start_position: crate::camera::DEFAULT_POSITION.to_array(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            power: DEFAULT_POWER,
            bailout: DEFAULT_BAILOUT,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid settings JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("In {}", path.display()))
    }

    /// Settings file named by `--config` (or defaults) with flags applied
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.apply_cli(cli);
        Ok(settings)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(width) = cli.width {
            self.width = width;
        }
        if let Some(height) = cli.height {
            self.height = height;
        }
        if let Some(strategy) = cli.strategy {
            self.strategy = strategy;
        }
        if let Some(sensitivity) = cli.sensitivity {
            self.sensitivity = sensitivity;
        }
        if cli.adaptive_speed {
            self.adaptive_speed = true;
        }
    }

    pub fn camera(&self) -> Camera {
        let orientation = Orientation::new(
            crate::camera::orientation::DEFAULT_YAW,
            crate::camera::orientation::DEFAULT_PITCH,
            self.sensitivity,
        );
        let envelope = MovementEnvelope::new(
            self.speed,
            self.min_speed,
            self.max_speed,
            self.depth_compensation,
        );
        Camera::new(self.start_position.into(), orientation, envelope)
    }

    pub fn parameters(&self) -> RenderParameters {
        let mut params = RenderParameters::new(self.width, self.height);
        params.bump_iterations(self.max_iterations - params.max_iterations);
        params.bump_power(self.power - params.power);
        params.bump_bailout(self.bailout - params.bailout);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "width": 640, "strategy": "direct" }"#).unwrap();
        assert_eq!(settings.width, 640);
        assert_eq!(settings.height, 720);
        assert_eq!(settings.strategy, StrategyChoice::Direct);
        assert!(settings.depth_compensation);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Settings::from_json("{ width: }").is_err());
        assert!(Settings::from_json(r#"{ "strategy": "raytrace" }"#).is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut settings = Settings::from_json(r#"{ "width": 640, "sensitivity": 0.3 }"#).unwrap();
        let cli = Cli {
            width: Some(1920),
            adaptive_speed: true,
            ..Default::default()
        };
        settings.apply_cli(&cli);

        assert_eq!(settings.width, 1920);
        assert_eq!(settings.sensitivity, 0.3);
        assert!(settings.adaptive_speed);
    }

    #[test]
    fn test_parameters_saturate_out_of_range_values() {
        let settings = Settings {
            max_iterations: 10_000,
            power: 1.0,
            ..Default::default()
        };
        let params = settings.parameters();
        assert_eq!(params.max_iterations, 256);
        assert_eq!(params.power, 2.0);
        assert_eq!(params.bailout, DEFAULT_BAILOUT);
    }

    #[test]
    fn test_camera_from_defaults() {
        let camera = Settings::default().camera();
        assert_eq!(camera.world_position(), crate::camera::DEFAULT_POSITION);
        assert_eq!(camera.orientation().sensitivity(), DEFAULT_SENSITIVITY);
    }
}
