//! Teapot viewer: wires configuration, assets and the Vulkan device into the runtime.
//!
//! Built as a `cdylib` exporting `android_main` for NativeActivity, and as an
//! `rlib` used by the desktop binary.

use anyhow::Result;
use winit::event_loop::EventLoop;

use teapot_engine::assets::AssetSource;
use teapot_engine::config::ViewerConfig;
use teapot_engine::core::Shell;
use teapot_engine::device::VulkanFactory;
use teapot_engine::window::Runtime;

#[cfg(target_os = "android")]
mod android;

/// Runs the viewer on `event_loop` until the window goes away or initialization fails.
pub fn run(event_loop: EventLoop<()>, config: ViewerConfig, assets: impl AssetSource + 'static) -> Result<()> {
    log::info!(
        "starting viewer: redraw={}, rotation={:?}",
        config.shell.redraw,
        config.shell.rotation
    );

    let factory = VulkanFactory::new(config.device, assets);
    let shell = Shell::new(config.shell, factory);

    Runtime::run_with_event_loop(event_loop, config.runtime, shell)
}
