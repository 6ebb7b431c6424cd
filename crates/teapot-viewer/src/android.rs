use std::ffi::CString;
use std::io::Read;

use anyhow::{Context as _, Result};
use winit::event_loop::EventLoop;
use winit::platform::android::activity::AndroidApp;
use winit::platform::android::EventLoopBuilderExtAndroid;

use teapot_engine::assets::AssetSource;
use teapot_engine::config::ViewerConfig;
use teapot_engine::logging::init_logging;

/// Files packaged under the APK's `assets/` directory.
struct ApkAssets {
    app: AndroidApp,
}

impl AssetSource for ApkAssets {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let name = CString::new(path).context("asset path contains NUL")?;
        let mut asset = self
            .app
            .asset_manager()
            .open(&name)
            .with_context(|| format!("asset {path} not found in APK"))?;

        let mut bytes = Vec::new();
        asset
            .read_to_end(&mut bytes)
            .with_context(|| format!("read asset {path}"))?;
        Ok(bytes)
    }
}

#[unsafe(no_mangle)]
fn android_main(app: AndroidApp) {
    let config = ViewerConfig::from_env();
    init_logging(config.as_ref().map(|c| c.logging.clone()).unwrap_or_default());

    let config = config.unwrap_or_else(|e| {
        log::warn!("ignoring environment overrides: {e:#}");
        ViewerConfig::default()
    });

    if let Err(e) = start(app, config) {
        log::error!("viewer terminated: {e:#}");
    }
}

fn start(app: AndroidApp, config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::builder()
        .with_android_app(app.clone())
        .build()
        .context("failed to create winit EventLoop")?;

    crate::run(event_loop, config, ApkAssets { app })
}
