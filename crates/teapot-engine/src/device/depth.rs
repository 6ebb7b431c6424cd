use anyhow::{Context as _, Result};
use ash::vk;

use super::logical::DeviceContext;
use super::memory;

/// Depth attachment sized to the swapchain.
#[derive(Default)]
pub(crate) struct DepthTarget {
    pub format: vk::Format,
    pub image: vk::Image,
    pub memory: vk::DeviceMemory,
    pub view: vk::ImageView,
}

impl DepthTarget {
    /// Fills `self` in place so that a partial failure leaves handles for `destroy`.
    pub fn create(
        &mut self,
        instance: &ash::Instance,
        dev: &DeviceContext,
        candidates: &[vk::Format],
        extent: vk::Extent2D,
    ) -> Result<()> {
        let (format, tiling) = choose_depth_format(candidates, |f| unsafe {
            instance.get_physical_device_format_properties(dev.physical, f)
        })
        .with_context(|| format!("none of {candidates:?} usable as depth attachment"))?;
        log::info!("depth format {format:?} ({tiling:?} tiling)");
        self.format = format;

        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .extent(vk::Extent3D { width: extent.width, height: extent.height, depth: 1 })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(tiling)
            .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let device = &dev.device;
        self.image = unsafe { device.create_image(&image_info, None) }
            .context("create depth image")?;

        let reqs = unsafe { device.get_image_memory_requirements(self.image) };
        self.memory = memory::allocate(dev, reqs, vk::MemoryPropertyFlags::DEVICE_LOCAL)
            .or_else(|_| memory::allocate(dev, reqs, vk::MemoryPropertyFlags::empty()))
            .context("depth memory")?;
        unsafe { device.bind_image_memory(self.image, self.memory, 0) }
            .context("bind depth memory")?;

        let view_info = vk::ImageViewCreateInfo::default()
            .image(self.image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: depth_aspect(format),
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });
        self.view = unsafe { device.create_image_view(&view_info, None) }
            .context("create depth view")?;

        Ok(())
    }

    pub unsafe fn destroy(&mut self, device: &ash::Device) {
        unsafe {
            device.destroy_image_view(self.view, None);
            device.destroy_image(self.image, None);
            device.free_memory(self.memory, None);
        }
        *self = Self::default();
    }
}

/// First candidate usable as a depth-stencil attachment, with the tiling that supports it.
///
/// Optimal tiling is preferred over linear.
pub(crate) fn choose_depth_format(
    candidates: &[vk::Format],
    properties: impl Fn(vk::Format) -> vk::FormatProperties,
) -> Option<(vk::Format, vk::ImageTiling)> {
    let wanted = vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT;

    candidates.iter().find_map(|&format| {
        let props = properties(format);
        if props.optimal_tiling_features.contains(wanted) {
            Some((format, vk::ImageTiling::OPTIMAL))
        } else if props.linear_tiling_features.contains(wanted) {
            Some((format, vk::ImageTiling::LINEAR))
        } else {
            None
        }
    })
}

pub(crate) fn depth_aspect(format: vk::Format) -> vk::ImageAspectFlags {
    match format {
        vk::Format::D16_UNORM_S8_UINT
        | vk::Format::D24_UNORM_S8_UINT
        | vk::Format::D32_SFLOAT_S8_UINT => {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        }
        _ => vk::ImageAspectFlags::DEPTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DS: vk::FormatFeatureFlags = vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT;

    fn props(optimal: bool, linear: bool) -> vk::FormatProperties {
        vk::FormatProperties {
            optimal_tiling_features: if optimal { DS } else { vk::FormatFeatureFlags::empty() },
            linear_tiling_features: if linear { DS } else { vk::FormatFeatureFlags::empty() },
            ..Default::default()
        }
    }

    const CANDIDATES: [vk::Format; 3] =
        [vk::Format::D24_UNORM_S8_UINT, vk::Format::D32_SFLOAT, vk::Format::D16_UNORM];

    #[test]
    fn first_supported_candidate_wins() {
        let picked = choose_depth_format(&CANDIDATES, |f| {
            props(f != vk::Format::D24_UNORM_S8_UINT, false)
        });
        assert_eq!(picked, Some((vk::Format::D32_SFLOAT, vk::ImageTiling::OPTIMAL)));
    }

    #[test]
    fn optimal_preferred_over_linear() {
        let picked = choose_depth_format(&CANDIDATES, |_| props(true, true));
        assert_eq!(picked, Some((vk::Format::D24_UNORM_S8_UINT, vk::ImageTiling::OPTIMAL)));
    }

    #[test]
    fn linear_only_is_accepted() {
        let picked = choose_depth_format(&CANDIDATES, |f| props(false, f == vk::Format::D16_UNORM));
        assert_eq!(picked, Some((vk::Format::D16_UNORM, vk::ImageTiling::LINEAR)));
    }

    #[test]
    fn none_when_unsupported() {
        assert_eq!(choose_depth_format(&CANDIDATES, |_| props(false, false)), None);
    }

    #[test]
    fn stencil_aspect_only_for_combined_formats() {
        let both = vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL;
        assert_eq!(depth_aspect(vk::Format::D24_UNORM_S8_UINT), both);
        assert_eq!(depth_aspect(vk::Format::D32_SFLOAT), vk::ImageAspectFlags::DEPTH);
        assert_eq!(depth_aspect(vk::Format::D16_UNORM), vk::ImageAspectFlags::DEPTH);
    }
}
