use std::process::ExitCode;

use clap::Parser;
use mandelbulb_flight::cli::Cli;
use mandelbulb_flight::params::Controls;
use mandelbulb_flight::{app, Settings};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = match Settings::resolve(&cli) {
        Ok(settings) => settings,
        Err(error) => {
            log::error!("{error:#}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("Mandelbulb Explorer - controls:");
    for line in Controls::help() {
        log::info!("  {line}");
    }

    match app::run(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
