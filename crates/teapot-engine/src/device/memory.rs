use anyhow::{Context as _, Result};
use ash::vk;

use super::logical::DeviceContext;

/// Finds the first memory type allowed by `type_bits` whose flags include `required`.
pub fn find_memory_type(
    props: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    required: vk::MemoryPropertyFlags,
) -> Option<u32> {
    props.memory_types[..props.memory_type_count as usize]
        .iter()
        .enumerate()
        .find(|&(i, ty)| type_bits & (1 << i) != 0 && ty.property_flags.contains(required))
        .map(|(i, _)| i as u32)
}

/// Allocates memory satisfying `reqs` from the first type that has `flags`.
pub(crate) fn allocate(
    dev: &DeviceContext,
    reqs: vk::MemoryRequirements,
    flags: vk::MemoryPropertyFlags,
) -> Result<vk::DeviceMemory> {
    let type_index = find_memory_type(&dev.memory_properties, reqs.memory_type_bits, flags)
        .with_context(|| format!("no memory type with {flags:?}"))?;

    let info = vk::MemoryAllocateInfo::default()
        .allocation_size(reqs.size)
        .memory_type_index(type_index);

    unsafe { dev.device.allocate_memory(&info, None) }.context("allocate device memory")
}
