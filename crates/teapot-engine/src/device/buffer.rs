use anyhow::{Context as _, Result};
use ash::vk;

use super::logical::DeviceContext;
use super::memory;

/// Buffer in host-visible, host-coherent memory, written with map/copy/unmap.
#[derive(Default)]
pub(crate) struct HostBuffer {
    pub buffer: vk::Buffer,
    pub memory: vk::DeviceMemory,
    pub size: vk::DeviceSize,
}

impl HostBuffer {
    /// Creates a buffer of `bytes.len()` bytes and uploads `bytes` into it.
    ///
    /// On error the partially created handles remain in `self` for `destroy`.
    pub fn create(
        &mut self,
        dev: &DeviceContext,
        usage: vk::BufferUsageFlags,
        bytes: &[u8],
        what: &str,
    ) -> Result<()> {
        anyhow::ensure!(!bytes.is_empty(), "{what}: empty buffer");

        let device = &dev.device;
        let info = vk::BufferCreateInfo::default()
            .size(bytes.len() as vk::DeviceSize)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        self.buffer = unsafe { device.create_buffer(&info, None) }
            .with_context(|| format!("create {what} buffer"))?;
        self.size = bytes.len() as vk::DeviceSize;

        let reqs = unsafe { device.get_buffer_memory_requirements(self.buffer) };
        self.memory = memory::allocate(
            dev,
            reqs,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )
        .with_context(|| format!("{what} memory"))?;

        unsafe { device.bind_buffer_memory(self.buffer, self.memory, 0) }
            .with_context(|| format!("bind {what} memory"))?;

        self.write(device, bytes)
            .with_context(|| format!("upload {what}"))
    }

    /// Copies `bytes` to the start of the buffer.
    pub fn write(&self, device: &ash::Device, bytes: &[u8]) -> Result<()> {
        anyhow::ensure!(
            bytes.len() as vk::DeviceSize <= self.size,
            "write of {} bytes into {}-byte buffer",
            bytes.len(),
            self.size
        );

        unsafe {
            let ptr = device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                .context("map memory")?;
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.cast::<u8>(), bytes.len());
            device.unmap_memory(self.memory);
        }
        Ok(())
    }

    pub fn descriptor_info(&self) -> vk::DescriptorBufferInfo {
        vk::DescriptorBufferInfo {
            buffer: self.buffer,
            offset: 0,
            range: self.size,
        }
    }

    pub unsafe fn destroy(&mut self, device: &ash::Device) {
        unsafe {
            device.destroy_buffer(self.buffer, None);
            device.free_memory(self.memory, None);
        }
        *self = Self::default();
    }
}
