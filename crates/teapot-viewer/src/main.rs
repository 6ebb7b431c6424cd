use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use winit::event_loop::EventLoop;

use teapot_engine::assets::DirAssets;
use teapot_engine::config::ViewerConfig;
use teapot_engine::logging::init_logging;

/// Overrides the directory holding `shaders/*.spv`.
const ENV_ASSETS: &str = "TEAPOT_ASSETS";

fn main() -> ExitCode {
    let config = match ViewerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("invalid configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.logging.clone());

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: ViewerConfig) -> Result<()> {
    let root = std::env::var_os(ENV_ASSETS)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets"));
    log::info!("assets from {}", root.display());

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    teapot_viewer::run(event_loop, config, DirAssets::new(root))
}
