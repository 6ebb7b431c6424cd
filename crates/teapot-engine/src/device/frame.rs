use anyhow::{Context as _, Result};
use ash::vk;

use super::error::retry_transient;
use super::logical::DeviceContext;
use super::swapchain::Swapchain;

/// Acquisition semaphore and the completion fence of the single in-flight submission.
#[derive(Default)]
pub(crate) struct FrameSync {
    pub image_acquired: vk::Semaphore,
    pub draw_fence: vk::Fence,
}

impl FrameSync {
    /// The fence starts signalled so the first draw does not wait on anything.
    pub fn create(&mut self, device: &ash::Device) -> Result<()> {
        self.image_acquired =
            unsafe { device.create_semaphore(&vk::SemaphoreCreateInfo::default(), None) }
                .context("create acquire semaphore")?;
        let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);
        self.draw_fence = unsafe { device.create_fence(&fence_info, None) }
            .context("create draw fence")?;
        Ok(())
    }

    pub unsafe fn destroy(&mut self, device: &ash::Device) {
        unsafe {
            device.destroy_fence(self.draw_fence, None);
            device.destroy_semaphore(self.image_acquired, None);
        }
        *self = Self::default();
    }
}

/// Limits applied to every blocking wait in a frame.
#[derive(Debug, Copy, Clone)]
pub(crate) struct WaitBudget {
    pub timeout_ns: u64,
    pub attempts: u32,
}

/// Acquire, replay the image's command buffer, wait for it, present.
///
/// Returns the presented image index.
pub(crate) fn submit_frame(
    dev: &DeviceContext,
    swapchain: &Swapchain,
    sync: &FrameSync,
    cmds: &[vk::CommandBuffer],
    budget: WaitBudget,
) -> Result<u32> {
    let device = &dev.device;
    let fences = [sync.draw_fence];

    let (index, suboptimal) = retry_transient(budget.attempts, "acquire next image", || unsafe {
        dev.swapchain_loader.acquire_next_image(
            swapchain.handle,
            budget.timeout_ns,
            sync.image_acquired,
            vk::Fence::null(),
        )
    })?;
    if suboptimal {
        log::warn!("acquire: swapchain suboptimal");
    }

    let cmd = *cmds
        .get(index as usize)
        .with_context(|| format!("no command buffer for image {index}"))?;

    retry_transient(budget.attempts, "wait previous submission", || unsafe {
        device.wait_for_fences(&fences, true, budget.timeout_ns)
    })?;
    unsafe { device.reset_fences(&fences) }.context("reset draw fence")?;

    let wait_semaphores = [sync.image_acquired];
    let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
    let command_buffers = [cmd];
    let submit = vk::SubmitInfo::default()
        .wait_semaphores(&wait_semaphores)
        .wait_dst_stage_mask(&wait_stages)
        .command_buffers(&command_buffers);

    unsafe { device.queue_submit(dev.queue, &[submit], sync.draw_fence) }
        .context("queue submit")?;

    retry_transient(budget.attempts, "wait draw fence", || unsafe {
        device.wait_for_fences(&fences, true, budget.timeout_ns)
    })?;

    let swapchains = [swapchain.handle];
    let indices = [index];
    let present = vk::PresentInfoKHR::default()
        .swapchains(&swapchains)
        .image_indices(&indices);

    let suboptimal = unsafe { dev.swapchain_loader.queue_present(dev.queue, &present) }
        .context("queue present")?;
    if suboptimal {
        log::warn!("present: swapchain suboptimal");
    }

    Ok(index)
}
