use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use anyhow::{anyhow, Context as _, Result};

use crate::input::{drag_to_degrees, DragTracker, Gesture, InputEvent, KeyEvent, MotionEvent};
use crate::scene::RotationMode;

use super::device::{DeviceFactory, Extent, RenderDevice};

/// When the shell asks for a frame after initialization.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum RedrawPolicy {
    /// Only the frame presented during initialization.
    Never,
    /// One frame after each rotation change.
    #[default]
    OnDemand,
    /// Every loop iteration.
    Continuous,
}

impl FromStr for RedrawPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "on-demand" | "ondemand" => Ok(Self::OnDemand),
            "continuous" => Ok(Self::Continuous),
            other => Err(anyhow!(
                "unknown redraw policy {other:?} (expected never, on-demand or continuous)"
            )),
        }
    }
}

impl fmt::Display for RedrawPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Never => "never",
            Self::OnDemand => "on-demand",
            Self::Continuous => "continuous",
        })
    }
}

/// Shell behaviour knobs.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ShellConfig {
    pub redraw: RedrawPolicy,
    pub rotation: RotationMode,
}

/// Forwards host lifecycle and input events to the render device.
///
/// Owns the device for as long as the host window exists. `W` is the window type
/// handed to the factory.
pub struct Shell<W: ?Sized, F: DeviceFactory<W>> {
    config: ShellConfig,
    factory: F,
    device: Option<F::Device>,
    drag: DragTracker,
    /// The uniform buffer changed since the last draw.
    dirty: bool,
    _window: PhantomData<fn(&W)>,
}

impl<W: ?Sized, F: DeviceFactory<W>> Shell<W, F> {
    pub fn new(config: ShellConfig, factory: F) -> Self {
        Self {
            config,
            factory,
            device: None,
            drag: DragTracker::default(),
            dirty: false,
            _window: PhantomData,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn device(&self) -> Option<&F::Device> {
        self.device.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.device.as_ref().is_some_and(|d| d.is_ready())
    }

    /// Current rotation, when a device exists.
    pub fn rotation_degrees(&self) -> Option<f32> {
        self.device.as_ref().map(|d| d.rotation_degrees())
    }

    /// Initializes the device for a new window. An error here is fatal.
    pub fn on_window_created(&mut self, window: &W, size: Extent) -> Result<()> {
        if self.device.take().is_some() {
            log::warn!("window created while a device exists; replacing it");
        }

        log::info!("window created ({}x{})", size.width, size.height);
        let device = self
            .factory
            .create(window, size)
            .context("device initialization failed")?;

        self.device = Some(device);
        self.drag = DragTracker::default();
        self.dirty = false;
        Ok(())
    }

    /// Frees the device. The window must still be alive when this is called.
    pub fn on_window_destroyed(&mut self) {
        if self.device.take().is_some() {
            log::info!("window destroyed; device released");
        }
        self.drag = DragTracker::default();
        self.dirty = false;
    }

    pub fn on_input(&mut self, event: &InputEvent) -> Result<()> {
        match event {
            InputEvent::Motion(m) => self.on_motion(m),
            InputEvent::Key(k) => {
                self.on_key(k);
                Ok(())
            }
        }
    }

    /// Turns horizontal drags into rotations about the up axis.
    pub fn on_motion(&mut self, event: &MotionEvent) -> Result<()> {
        match self.drag.apply(event) {
            Gesture::Pressed { x, y } => log::debug!("press at ({x:.1}, {y:.1})"),
            Gesture::Tapped { x, y } => log::debug!("tap at ({x:.1}, {y:.1})"),
            Gesture::Released { x, y } => log::debug!("release at ({x:.1}, {y:.1})"),
            Gesture::Cancelled => log::debug!("drag cancelled"),
            Gesture::Ignored => {}

            Gesture::Dragged(delta) => {
                let mode = self.config.rotation;
                let Some(device) = self.device.as_mut().filter(|d| d.is_ready()) else {
                    return Ok(());
                };

                let dx = match mode {
                    RotationMode::Replace => delta.total_x,
                    RotationMode::Accumulate => delta.step_x,
                };
                let degrees = drag_to_degrees(dx, device.extent().width);
                log::debug!("drag dx={dx:.1} -> {degrees:.2} deg ({mode:?})");

                device.rotate(degrees, mode).context("rotate")?;
                self.dirty = true;
            }
        }
        Ok(())
    }

    pub fn on_key(&self, event: &KeyEvent) {
        log::info!(
            "key {:?} code={} repeat={}",
            event.state,
            event.code,
            event.repeat
        );
    }

    /// Whether the runtime should schedule a draw this iteration.
    pub fn wants_draw(&self) -> bool {
        if !self.is_ready() {
            return false;
        }
        match self.config.redraw {
            RedrawPolicy::Never => false,
            RedrawPolicy::OnDemand => self.dirty,
            RedrawPolicy::Continuous => true,
        }
    }

    /// Draws one frame if the device is ready.
    pub fn draw_frame(&mut self) -> Result<()> {
        let Some(device) = self.device.as_mut().filter(|d| d.is_ready()) else {
            return Ok(());
        };
        device.draw().context("draw")?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::input::{KeyState, MotionAction};
    use crate::scene::{Camera, MvpTransform};

    struct MockDevice {
        extent: Extent,
        transform: MvpTransform,
        draws: u32,
        fail_draw: bool,
    }

    impl RenderDevice for MockDevice {
        fn is_ready(&self) -> bool {
            true
        }

        fn extent(&self) -> Extent {
            self.extent
        }

        fn rotation_degrees(&self) -> f32 {
            self.transform.angle_degrees()
        }

        fn rotate(&mut self, degrees: f32, mode: RotationMode) -> Result<()> {
            self.transform.rotate(degrees, mode);
            Ok(())
        }

        fn draw(&mut self) -> Result<()> {
            anyhow::ensure!(!self.fail_draw, "device lost");
            self.draws += 1;
            Ok(())
        }
    }

    /// Single-image 800x600 "swapchain".
    #[derive(Default)]
    struct MockFactory {
        created: u32,
        fail: bool,
        fail_draw: bool,
    }

    impl DeviceFactory<()> for MockFactory {
        type Device = MockDevice;

        fn create(&mut self, _window: &(), size: Extent) -> Result<MockDevice> {
            anyhow::ensure!(!self.fail, "no Vulkan driver");
            self.created += 1;
            Ok(MockDevice {
                extent: size,
                transform: MvpTransform::new(&Camera::default(), size.width, size.height),
                draws: 0,
                fail_draw: self.fail_draw,
            })
        }
    }

    const SIZE: Extent = Extent::new(800, 600);

    fn shell(config: ShellConfig) -> Shell<(), MockFactory> {
        let mut s = Shell::new(config, MockFactory::default());
        s.on_window_created(&(), SIZE).unwrap();
        s
    }

    fn motion(action: MotionAction, x: f32) -> MotionEvent {
        MotionEvent { action, pointer: 0, x, y: 300.0 }
    }

    fn drag(s: &mut Shell<(), MockFactory>, from: f32, to: f32) {
        s.on_motion(&motion(MotionAction::Down, from)).unwrap();
        s.on_motion(&motion(MotionAction::Move, to)).unwrap();
        s.on_motion(&motion(MotionAction::Up, to)).unwrap();
    }

    // ── lifecycle ────────────────────────────────────────────────────────

    #[test]
    fn ready_after_window_created() {
        let s = shell(ShellConfig::default());
        assert!(s.is_ready());
        assert_eq!(s.device().map(|d| d.extent()), Some(SIZE));
    }

    #[test]
    fn not_ready_after_window_destroyed() {
        let mut s = shell(ShellConfig::default());
        s.on_window_destroyed();
        assert!(!s.is_ready());
        assert!(!s.wants_draw());
        assert!(s.draw_frame().is_ok());
    }

    #[test]
    fn factory_error_is_reported() {
        let factory = MockFactory { fail: true, ..Default::default() };
        let mut s: Shell<(), MockFactory> = Shell::new(ShellConfig::default(), factory);

        let err = s.on_window_created(&(), SIZE).unwrap_err();
        assert!(format!("{err:#}").contains("no Vulkan driver"));
        assert!(!s.is_ready());
    }

    #[test]
    fn recreating_window_replaces_device() {
        let mut s = shell(ShellConfig::default());
        s.on_window_created(&(), Extent::new(400, 400)).unwrap();
        assert_eq!(s.device().map(|d| d.extent().width), Some(400));
    }

    // ── rotation ─────────────────────────────────────────────────────────

    #[test]
    fn quarter_width_drag_is_quarter_turn() {
        let mut s = shell(ShellConfig::default());
        drag(&mut s, 100.0, 300.0);
        let angle = s.rotation_degrees().unwrap();
        assert!((angle - 90.0).abs() < 1e-3, "angle {angle}");
    }

    #[test]
    fn replace_mode_does_not_compose_drags() {
        let mut s = shell(ShellConfig::default());
        drag(&mut s, 0.0, 200.0);
        drag(&mut s, 0.0, 200.0);
        assert!((s.rotation_degrees().unwrap() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn accumulate_mode_composes_drags() {
        let config = ShellConfig { rotation: RotationMode::Accumulate, ..Default::default() };
        let mut s = shell(config);
        drag(&mut s, 0.0, 200.0);
        drag(&mut s, 0.0, 200.0);
        assert!((s.rotation_degrees().unwrap() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn drag_before_window_is_ignored() {
        let mut s: Shell<(), MockFactory> =
            Shell::new(ShellConfig::default(), MockFactory::default());
        drag(&mut s, 0.0, 200.0);
        assert_eq!(s.rotation_degrees(), None);
    }

    #[test]
    fn keys_do_not_change_state() {
        let mut s = shell(ShellConfig::default());
        let key = KeyEvent { state: KeyState::Pressed, code: 4, repeat: false };
        s.on_input(&InputEvent::Key(key)).unwrap();
        assert!(!s.wants_draw());
        assert_eq!(s.rotation_degrees(), Some(0.0));
    }

    // ── redraw policy ────────────────────────────────────────────────────

    #[test]
    fn on_demand_draws_once_per_change() {
        let mut s = shell(ShellConfig::default());
        assert!(!s.wants_draw());

        drag(&mut s, 0.0, 50.0);
        assert!(s.wants_draw());
        s.draw_frame().unwrap();
        assert!(!s.wants_draw());
        assert_eq!(s.device().unwrap().draws, 1);
    }

    #[test]
    fn never_policy_never_draws() {
        let config = ShellConfig { redraw: RedrawPolicy::Never, ..Default::default() };
        let mut s = shell(config);
        drag(&mut s, 0.0, 50.0);
        assert!(!s.wants_draw());
    }

    #[test]
    fn continuous_policy_always_draws() {
        let config = ShellConfig { redraw: RedrawPolicy::Continuous, ..Default::default() };
        let s = shell(config);
        assert!(s.wants_draw());
    }

    #[test]
    fn draw_error_carries_context() {
        let factory = MockFactory { fail_draw: true, ..Default::default() };
        let mut s: Shell<(), MockFactory> = Shell::new(ShellConfig::default(), factory);
        s.on_window_created(&(), SIZE).unwrap();

        let err = s.draw_frame().unwrap_err();
        assert_eq!(format!("{err:#}"), "draw: device lost");
    }

    // ── parsing ──────────────────────────────────────────────────────────

    #[test]
    fn redraw_policy_parses() {
        assert_eq!("never".parse::<RedrawPolicy>().unwrap(), RedrawPolicy::Never);
        assert_eq!(" On-Demand ".parse::<RedrawPolicy>().unwrap(), RedrawPolicy::OnDemand);
        assert_eq!("continuous".parse::<RedrawPolicy>().unwrap(), RedrawPolicy::Continuous);
        assert!("sometimes".parse::<RedrawPolicy>().is_err());
        assert_eq!(RedrawPolicy::OnDemand.to_string(), "on-demand");
    }
}
