use anyhow::{anyhow, Context as _, Result};
use ash::{khr, vk};

use super::instance::InstanceContext;

/// Physical device, logical device and the graphics/present queue.
pub(crate) struct DeviceContext {
    pub physical: vk::PhysicalDevice,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub queue_family: u32,
    pub device: ash::Device,
    pub queue: vk::Queue,
    pub swapchain_loader: khr::swapchain::Device,
}

impl DeviceContext {
    pub fn new(ctx: &InstanceContext) -> Result<Self> {
        let (physical, queue_family) = pick_physical_device(ctx)?;

        let instance = &ctx.instance;
        let memory_properties = unsafe { instance.get_physical_device_memory_properties(physical) };

        let priorities = [1.0_f32];
        let queue_info = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family)
            .queue_priorities(&priorities)];

        let mut extensions = vec![khr::swapchain::NAME.as_ptr()];
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            extensions.push(khr::portability_subset::NAME.as_ptr());
        }

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_info)
            .enabled_extension_names(&extensions);

        let device = unsafe { instance.create_device(physical, &create_info, None) }
            .context("create logical device")?;
        let queue = unsafe { device.get_device_queue(queue_family, 0) };
        let swapchain_loader = khr::swapchain::Device::new(instance, &device);

        Ok(Self {
            physical,
            memory_properties,
            queue_family,
            device,
            queue,
            swapchain_loader,
        })
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        unsafe { self.device.destroy_device(None) };
    }
}

/// Returns the first physical device that has a queue family supporting graphics and present.
fn pick_physical_device(ctx: &InstanceContext) -> Result<(vk::PhysicalDevice, u32)> {
    let devices = unsafe { ctx.instance.enumerate_physical_devices() }
        .context("enumerate physical devices")?;
    anyhow::ensure!(!devices.is_empty(), "no Vulkan physical devices");
    log::info!("{} physical device(s)", devices.len());

    for phys in devices {
        let families = unsafe { ctx.instance.get_physical_device_queue_family_properties(phys) };

        let family = pick_queue_family(&families, |i| {
            let supported = unsafe {
                ctx.surface_loader
                    .get_physical_device_surface_support(phys, i, ctx.surface)
            };
            supported.context("query surface support")
        })?;

        if let Some(family) = family {
            let props = unsafe { ctx.instance.get_physical_device_properties(phys) };
            let name = props
                .device_name_as_c_str()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            log::info!("using GPU \"{name}\", queue family {family}");
            return Ok((phys, family));
        }
    }

    Err(anyhow!("no queue family supports both graphics and present"))
}

/// Returns the first queue family with graphics capability for which `supports_present` holds.
pub(crate) fn pick_queue_family(
    families: &[vk::QueueFamilyProperties],
    mut supports_present: impl FnMut(u32) -> Result<bool>,
) -> Result<Option<u32>> {
    for (i, family) in families.iter().enumerate() {
        let i = i as u32;
        if family.queue_flags.contains(vk::QueueFlags::GRAPHICS) && supports_present(i)? {
            return Ok(Some(i));
        }
    }
    Ok(None)
}
