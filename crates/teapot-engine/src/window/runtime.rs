use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::core::{DeviceFactory, Extent, RedrawPolicy, Shell};
use crate::input::platform::MouseEmulation;

/// Window/runtime configuration.
///
/// Title and size only apply on desktop; Android hands over a full-screen native window.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan Teapot".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `event_loop` until the window closes or a fatal error occurs.
    ///
    /// The caller builds the loop (Android builds it from the `AndroidApp`).
    pub fn run_with_event_loop<F>(
        event_loop: EventLoop<()>,
        config: RuntimeConfig,
        shell: Shell<Window, F>,
    ) -> Result<()>
    where
        F: DeviceFactory<Window> + 'static,
    {
        let mut state = AppState::new(config, shell);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        anyhow::ensure!(!state.failed, "viewer stopped after a fatal error");
        Ok(())
    }
}

/// The swapchain is sized once at init, so the window is not user-resizable.
fn window_attributes(config: &RuntimeConfig) -> WindowAttributes {
    Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(config.initial_size)
        .with_resizable(false)
}

struct AppState<F>
where
    F: DeviceFactory<Window> + 'static,
{
    config: RuntimeConfig,

    // Declared before `window` so the device is dropped while the window still exists.
    shell: Shell<Window, F>,
    mouse: MouseEmulation,
    window: Option<Window>,

    exit_requested: bool,
    failed: bool,
}

impl<F> AppState<F>
where
    F: DeviceFactory<Window> + 'static,
{
    fn new(config: RuntimeConfig, shell: Shell<Window, F>) -> Self {
        Self {
            config,
            shell,
            mouse: MouseEmulation::default(),
            window: None,
            exit_requested: false,
            failed: false,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, what: &str, e: anyhow::Error) {
        log::error!("{what}: {e:#}");
        self.failed = true;
        self.release_window();
        self.request_exit();
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(window_attributes(&self.config))
            .context("failed to create window")?;

        let size = window.inner_size();
        self.shell
            .on_window_created(&window, Extent::new(size.width, size.height))?;

        self.window = Some(window);
        Ok(())
    }

    fn release_window(&mut self) {
        self.shell.on_window_destroyed();
        self.window = None;
    }
}

impl<F> ApplicationHandler for AppState<F>
where
    F: DeviceFactory<Window> + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, "failed to initialize", e);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.release_window();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let flow = match self.shell.config().redraw {
            RedrawPolicy::Continuous => ControlFlow::Poll,
            RedrawPolicy::Never | RedrawPolicy::OnDemand => ControlFlow::Wait,
        };
        event_loop.set_control_flow(flow);

        if self.shell.wants_draw() {
            if let Some(w) = &self.window {
                w.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        if let Some(ev) = self.mouse.translate(&event) {
            if let Err(e) = self.shell.on_input(&ev) {
                self.fail(event_loop, "input handling failed", e);
                return;
            }
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.release_window();
                self.request_exit();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                log::debug!("resized to {}x{} (swapchain is not recreated)", size.width, size.height);
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.shell.draw_frame() {
                    self.fail(event_loop, "frame failed", e);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.release_window();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::Size;

    // ── window attributes ───────────────────────────────────────────────────

    #[test]
    fn window_is_not_resizable() {
        let attrs = window_attributes(&RuntimeConfig::default());
        assert!(!attrs.resizable);
    }

    #[test]
    fn window_uses_configured_title_and_size() {
        let config = RuntimeConfig {
            title: "teapot".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
        };
        let attrs = window_attributes(&config);

        assert_eq!(attrs.title, "teapot");
        assert_eq!(attrs.inner_size, Some(Size::Logical(LogicalSize::new(640.0, 480.0))));
    }
}
