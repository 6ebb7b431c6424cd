use anyhow::Result;

use crate::scene::RotationMode;

/// Drawable size in physical pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Rendering backend driven by the shell.
pub trait RenderDevice {
    /// Whether initialization completed and the device can draw.
    fn is_ready(&self) -> bool;

    /// Swapchain extent; drag distances are measured against its width.
    fn extent(&self) -> Extent;

    /// Current model rotation about the camera's up axis, in degrees.
    fn rotation_degrees(&self) -> f32;

    /// Updates the model rotation and re-uploads the MVP matrix.
    fn rotate(&mut self, degrees: f32, mode: RotationMode) -> Result<()>;

    /// Replays the pre-recorded command buffer for the next image and presents it.
    fn draw(&mut self) -> Result<()>;
}

/// Creates a device for a freshly created window.
///
/// The shell is generic over this so it can be driven without a GPU.
pub trait DeviceFactory<W: ?Sized> {
    type Device: RenderDevice;

    fn create(&mut self, window: &W, size: Extent) -> Result<Self::Device>;
}
