use anyhow::{Context as _, Result};
use ash::vk;

use super::init::DeviceInit;
use super::instance::InstanceContext;
use super::logical::DeviceContext;

/// Swapchain handle plus one image and view per presentable image.
#[derive(Default)]
pub(crate) struct Swapchain {
    pub handle: vk::SwapchainKHR,
    pub format: vk::Format,
    pub extent: vk::Extent2D,
    pub images: Vec<vk::Image>,
    pub views: Vec<vk::ImageView>,
}

impl Swapchain {
    pub fn new(
        inst: &InstanceContext,
        dev: &DeviceContext,
        init: &DeviceInit,
        window_extent: vk::Extent2D,
    ) -> Result<Self> {
        let loader = &inst.surface_loader;
        let (caps, formats, modes) = unsafe {
            (
                loader
                    .get_physical_device_surface_capabilities(dev.physical, inst.surface)
                    .context("query surface capabilities")?,
                loader
                    .get_physical_device_surface_formats(dev.physical, inst.surface)
                    .context("query surface formats")?,
                loader
                    .get_physical_device_surface_present_modes(dev.physical, inst.surface)
                    .context("query present modes")?,
            )
        };

        let surface_format =
            choose_surface_format(&formats).context("surface reports no formats")?;
        let present_mode = choose_present_mode(&modes, &init.present_modes);
        let image_count = choose_image_count(&caps);
        let extent = choose_extent(&caps, window_extent);
        anyhow::ensure!(extent.width > 0 && extent.height > 0, "surface has zero size");

        log::info!(
            "swapchain: {:?} {}x{}, {:?}, {} images",
            surface_format.format,
            extent.width,
            extent.height,
            present_mode,
            image_count
        );

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(inst.surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(choose_pre_transform(&caps))
            .composite_alpha(choose_composite_alpha(&caps))
            .present_mode(present_mode)
            .clipped(!cfg!(target_os = "android"));

        let mut swapchain = Self {
            handle: unsafe { dev.swapchain_loader.create_swapchain(&create_info, None) }
                .context("create swapchain")?,
            format: surface_format.format,
            extent,
            ..Default::default()
        };

        if let Err(e) = swapchain.create_views(dev) {
            unsafe { swapchain.destroy(dev) };
            return Err(e);
        }

        Ok(swapchain)
    }

    fn create_views(&mut self, dev: &DeviceContext) -> Result<()> {
        self.images = unsafe { dev.swapchain_loader.get_swapchain_images(self.handle) }
            .context("get swapchain images")?;

        for &image in &self.images {
            let info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(self.format)
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::R,
                    g: vk::ComponentSwizzle::G,
                    b: vk::ComponentSwizzle::B,
                    a: vk::ComponentSwizzle::A,
                })
                .subresource_range(color_range());
            let view = unsafe { dev.device.create_image_view(&info, None) }
                .context("create swapchain image view")?;
            self.views.push(view);
        }
        Ok(())
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub unsafe fn destroy(&mut self, dev: &DeviceContext) {
        unsafe {
            for view in self.views.drain(..) {
                dev.device.destroy_image_view(view, None);
            }
            self.images.clear();
            dev.swapchain_loader.destroy_swapchain(self.handle, None);
        }
        self.handle = vk::SwapchainKHR::null();
    }
}

fn color_range() -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask: vk::ImageAspectFlags::COLOR,
        base_mip_level: 0,
        level_count: 1,
        base_array_layer: 0,
        layer_count: 1,
    }
}

/// Returns the first preferred mode the surface supports, else FIFO.
pub(crate) fn choose_present_mode(
    available: &[vk::PresentModeKHR],
    preference: &[vk::PresentModeKHR],
) -> vk::PresentModeKHR {
    preference
        .iter()
        .copied()
        .find(|m| available.contains(m))
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

/// One more image than the minimum, clamped to the maximum when there is one.
pub(crate) fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let desired = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        desired.min(caps.max_image_count)
    } else {
        desired
    }
}

/// A lone `UNDEFINED` entry means the surface has no preference.
pub(crate) fn choose_surface_format(
    formats: &[vk::SurfaceFormatKHR],
) -> Option<vk::SurfaceFormatKHR> {
    match formats {
        [] => None,
        [only] if only.format == vk::Format::UNDEFINED => Some(vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }),
        [first, ..] => Some(*first),
    }
}

/// Uses the surface's current extent, or the window size when the surface leaves it open.
pub(crate) fn choose_extent(
    caps: &vk::SurfaceCapabilitiesKHR,
    window: vk::Extent2D,
) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }
    vk::Extent2D {
        width: window
            .width
            .clamp(caps.min_image_extent.width, caps.max_image_extent.width),
        height: window
            .height
            .clamp(caps.min_image_extent.height, caps.max_image_extent.height),
    }
}

pub(crate) fn choose_pre_transform(
    caps: &vk::SurfaceCapabilitiesKHR,
) -> vk::SurfaceTransformFlagsKHR {
    if caps
        .supported_transforms
        .contains(vk::SurfaceTransformFlagsKHR::IDENTITY)
    {
        vk::SurfaceTransformFlagsKHR::IDENTITY
    } else {
        caps.current_transform
    }
}

/// Opaque when supported; Android surfaces often only offer `INHERIT`.
pub(crate) fn choose_composite_alpha(
    caps: &vk::SurfaceCapabilitiesKHR,
) -> vk::CompositeAlphaFlagsKHR {
    [
        vk::CompositeAlphaFlagsKHR::OPAQUE,
        vk::CompositeAlphaFlagsKHR::INHERIT,
        vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
    ]
    .into_iter()
    .find(|a| caps.supported_composite_alpha.contains(*a))
    .unwrap_or(vk::CompositeAlphaFlagsKHR::OPAQUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    use ash::vk::PresentModeKHR as P;

    fn caps() -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 0,
            current_extent: vk::Extent2D { width: 1080, height: 1920 },
            min_image_extent: vk::Extent2D { width: 1, height: 1 },
            max_image_extent: vk::Extent2D { width: 4096, height: 4096 },
            supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY
                | vk::SurfaceTransformFlagsKHR::ROTATE_90,
            current_transform: vk::SurfaceTransformFlagsKHR::ROTATE_90,
            supported_composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
            ..Default::default()
        }
    }

    fn format(format: vk::Format) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR { format, color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR }
    }

    // ── present mode ─────────────────────────────────────────────────────

    #[test]
    fn mailbox_beats_immediate() {
        let pref = [P::MAILBOX, P::IMMEDIATE];
        assert_eq!(choose_present_mode(&[P::FIFO, P::IMMEDIATE, P::MAILBOX], &pref), P::MAILBOX);
        assert_eq!(choose_present_mode(&[P::IMMEDIATE, P::FIFO], &pref), P::IMMEDIATE);
    }

    #[test]
    fn falls_back_to_fifo() {
        let pref = [P::MAILBOX, P::IMMEDIATE];
        assert_eq!(choose_present_mode(&[P::FIFO, P::FIFO_RELAXED], &pref), P::FIFO);
        assert_eq!(choose_present_mode(&[], &pref), P::FIFO);
    }

    // ── image count ──────────────────────────────────────────────────────

    #[test]
    fn image_count_is_min_plus_one() {
        assert_eq!(choose_image_count(&caps()), 3);
    }

    #[test]
    fn image_count_clamped_to_max() {
        let c = vk::SurfaceCapabilitiesKHR { max_image_count: 2, ..caps() };
        assert_eq!(choose_image_count(&c), 2);
    }

    // ── format ───────────────────────────────────────────────────────────

    #[test]
    fn undefined_format_means_bgra8() {
        let f = choose_surface_format(&[format(vk::Format::UNDEFINED)]).unwrap();
        assert_eq!(f.format, vk::Format::B8G8R8A8_UNORM);
    }

    #[test]
    fn otherwise_first_format() {
        let f = choose_surface_format(&[
            format(vk::Format::R8G8B8A8_UNORM),
            format(vk::Format::B8G8R8A8_SRGB),
        ])
        .unwrap();
        assert_eq!(f.format, vk::Format::R8G8B8A8_UNORM);
        assert!(choose_surface_format(&[]).is_none());
    }

    // ── extent ───────────────────────────────────────────────────────────

    #[test]
    fn defined_extent_wins() {
        let e = choose_extent(&caps(), vk::Extent2D { width: 10, height: 10 });
        assert_eq!((e.width, e.height), (1080, 1920));
    }

    #[test]
    fn undefined_extent_uses_clamped_window() {
        let c = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D { width: u32::MAX, height: u32::MAX },
            ..caps()
        };
        let e = choose_extent(&c, vk::Extent2D { width: 800, height: 9000 });
        assert_eq!((e.width, e.height), (800, 4096));
    }

    // ── transform / alpha ────────────────────────────────────────────────

    #[test]
    fn identity_transform_when_supported() {
        assert_eq!(choose_pre_transform(&caps()), vk::SurfaceTransformFlagsKHR::IDENTITY);

        let c = vk::SurfaceCapabilitiesKHR {
            supported_transforms: vk::SurfaceTransformFlagsKHR::ROTATE_90,
            ..caps()
        };
        assert_eq!(choose_pre_transform(&c), vk::SurfaceTransformFlagsKHR::ROTATE_90);
    }

    #[test]
    fn composite_alpha_prefers_opaque_then_inherit() {
        assert_eq!(choose_composite_alpha(&caps()), vk::CompositeAlphaFlagsKHR::OPAQUE);

        let c = vk::SurfaceCapabilitiesKHR {
            supported_composite_alpha: vk::CompositeAlphaFlagsKHR::INHERIT
                | vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
            ..caps()
        };
        assert_eq!(choose_composite_alpha(&c), vk::CompositeAlphaFlagsKHR::INHERIT);
    }
}
