use ash::vk;

/// Initialization parameters for the Vulkan device.
///
/// Defaults reproduce the fixed configuration of the teapot sample.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Application and engine name reported to the driver.
    pub app_name: String,

    /// Present modes in order of preference.
    ///
    /// FIFO is always available and is used when none of these are supported.
    pub present_modes: Vec<vk::PresentModeKHR>,

    /// Depth formats in order of preference.
    pub depth_formats: Vec<vk::Format>,

    /// Clear colour of the colour attachment (RGBA).
    pub clear_color: [f32; 4],

    /// Timeout of a single fence wait or image acquisition, in nanoseconds.
    pub fence_timeout_ns: u64,

    /// Maximum number of timed-out waits before a draw is abandoned with an error.
    pub max_wait_attempts: u32,

    /// Asset path of the vertex shader bytecode.
    pub vertex_shader: String,

    /// Asset path of the fragment shader bytecode.
    pub fragment_shader: String,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            app_name: "VulkanTeapot".to_owned(),
            present_modes: vec![vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE],
            depth_formats: vec![
                vk::Format::D24_UNORM_S8_UINT,
                vk::Format::D32_SFLOAT,
                vk::Format::D16_UNORM,
            ],
            clear_color: [0.2, 0.2, 0.2, 0.2],
            fence_timeout_ns: 100_000_000,
            max_wait_attempts: 50,
            vertex_shader: "shaders/shape.vert.spv".to_owned(),
            fragment_shader: "shaders/shape.frag.spv".to_owned(),
        }
    }
}
