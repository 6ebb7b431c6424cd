use anyhow::{Context as _, Result};
use ash::vk;

pub(crate) fn create_command_pool(device: &ash::Device, queue_family: u32) -> Result<vk::CommandPool> {
    let info = vk::CommandPoolCreateInfo::default().queue_family_index(queue_family);
    unsafe { device.create_command_pool(&info, None) }.context("create command pool")
}

pub(crate) fn allocate_command_buffers(
    device: &ash::Device,
    pool: vk::CommandPool,
    count: usize,
) -> Result<Vec<vk::CommandBuffer>> {
    let info = vk::CommandBufferAllocateInfo::default()
        .command_pool(pool)
        .level(vk::CommandBufferLevel::PRIMARY)
        .command_buffer_count(count as u32);
    unsafe { device.allocate_command_buffers(&info) }.context("allocate command buffers")
}

/// Everything a per-image command buffer binds.
pub(crate) struct DrawRecording<'a> {
    pub render_pass: vk::RenderPass,
    pub framebuffers: &'a [vk::Framebuffer],
    pub extent: vk::Extent2D,
    pub clear_color: [f32; 4],
    pub pipeline: vk::Pipeline,
    pub pipeline_layout: vk::PipelineLayout,
    pub descriptor_set: vk::DescriptorSet,
    pub vertex_buffer: vk::Buffer,
    pub index_buffer: vk::Buffer,
    pub index_count: u32,
}

/// Records the teapot draw into each command buffer once; they are replayed verbatim.
pub(crate) fn record_draws(
    device: &ash::Device,
    cmds: &[vk::CommandBuffer],
    rec: &DrawRecording<'_>,
) -> Result<()> {
    anyhow::ensure!(
        cmds.len() == rec.framebuffers.len(),
        "{} command buffers for {} framebuffers",
        cmds.len(),
        rec.framebuffers.len()
    );

    let clear_values = [
        vk::ClearValue {
            color: vk::ClearColorValue { float32: rec.clear_color },
        },
        vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue { depth: 1.0, stencil: 0 },
        },
    ];

    for (&cmd, &framebuffer) in cmds.iter().zip(rec.framebuffers) {
        let begin = vk::RenderPassBeginInfo::default()
            .render_pass(rec.render_pass)
            .framebuffer(framebuffer)
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: rec.extent,
            })
            .clear_values(&clear_values);

        unsafe {
            device
                .begin_command_buffer(cmd, &vk::CommandBufferBeginInfo::default())
                .context("begin command buffer")?;

            device.cmd_begin_render_pass(cmd, &begin, vk::SubpassContents::INLINE);
            device.cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, rec.pipeline);
            device.cmd_bind_descriptor_sets(
                cmd,
                vk::PipelineBindPoint::GRAPHICS,
                rec.pipeline_layout,
                0,
                &[rec.descriptor_set],
                &[],
            );
            device.cmd_bind_vertex_buffers(cmd, 0, &[rec.vertex_buffer], &[0]);
            device.cmd_bind_index_buffer(cmd, rec.index_buffer, 0, vk::IndexType::UINT16);
            device.cmd_draw_indexed(cmd, rec.index_count, 1, 0, 0, 0);
            device.cmd_end_render_pass(cmd);

            device.end_command_buffer(cmd).context("end command buffer")?;
        }
    }

    log::debug!("recorded {} command buffers, {} indices", cmds.len(), rec.index_count);
    Ok(())
}
