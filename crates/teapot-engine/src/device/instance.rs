use std::ffi::CString;

use anyhow::{Context as _, Result};
use ash::{khr, vk, Entry};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

/// Vulkan loader, instance and the window surface.
///
/// The window must outlive this value; the surface is destroyed before the instance.
pub(crate) struct InstanceContext {
    /// Keeps the Vulkan loader library loaded.
    _entry: Entry,
    pub instance: ash::Instance,
    pub surface_loader: khr::surface::Instance,
    pub surface: vk::SurfaceKHR,
}

impl InstanceContext {
    pub fn new<W>(app_name: &str, window: &W) -> Result<Self>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        let display = window.display_handle().context("display handle")?.as_raw();
        let raw_window = window.window_handle().context("window handle")?.as_raw();

        let entry = unsafe { Entry::load() }.context("load Vulkan loader")?;

        let mut extensions = ash_window::enumerate_required_extensions(display)
            .context("query surface extensions")?
            .to_vec();

        let mut flags = vk::InstanceCreateFlags::empty();
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            extensions.push(khr::portability_enumeration::NAME.as_ptr());
            flags |= vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR;
        }

        let name = CString::new(app_name).context("application name contains NUL")?;
        let app_info = vk::ApplicationInfo::default()
            .application_name(&name)
            .application_version(1)
            .engine_name(&name)
            .engine_version(1)
            .api_version(vk::API_VERSION_1_0);

        let create_info = vk::InstanceCreateInfo::default()
            .flags(flags)
            .application_info(&app_info)
            .enabled_extension_names(&extensions);

        let instance = unsafe { entry.create_instance(&create_info, None) }
            .context("create Vulkan instance")?;

        let surface_loader = khr::surface::Instance::new(&entry, &instance);

        let surface =
            match unsafe { ash_window::create_surface(&entry, &instance, display, raw_window, None) } {
                Ok(s) => s,
                Err(e) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(e).context("create window surface");
                }
            };

        log::info!("Vulkan instance and surface created");

        Ok(Self {
            _entry: entry,
            instance,
            surface_loader,
            surface,
        })
    }
}

impl Drop for InstanceContext {
    fn drop(&mut self) {
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
            self.instance.destroy_instance(None);
        }
    }
}
