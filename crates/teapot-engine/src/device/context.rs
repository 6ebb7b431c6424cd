use anyhow::{Context as _, Result};
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::assets::{load_spirv, AssetSource};
use crate::core::{Extent, RenderDevice};
use crate::scene::{self, Camera, Mesh, MvpTransform, RotationMode};

use super::buffer::HostBuffer;
use super::commands::{self, DrawRecording};
use super::depth::DepthTarget;
use super::frame::{self, FrameSync, WaitBudget};
use super::init::DeviceInit;
use super::instance::InstanceContext;
use super::logical::DeviceContext;
use super::pipeline::{self, PipelineDesc};
use super::swapchain::Swapchain;

/// Device-level objects, created in field order and destroyed in reverse.
///
/// Every handle starts null; destroying a null handle is a no-op, so a partially
/// built set can be torn down with the same `destroy`.
#[derive(Default)]
struct Resources {
    swapchain: Swapchain,
    command_pool: vk::CommandPool,
    command_buffers: Vec<vk::CommandBuffer>,
    depth: DepthTarget,
    uniform: HostBuffer,
    set_layout: vk::DescriptorSetLayout,
    pipeline_layout: vk::PipelineLayout,
    render_pass: vk::RenderPass,
    vertex_shader: vk::ShaderModule,
    fragment_shader: vk::ShaderModule,
    framebuffers: Vec<vk::Framebuffer>,
    vertex: HostBuffer,
    index: HostBuffer,
    descriptor_pool: vk::DescriptorPool,
    descriptor_set: vk::DescriptorSet,
    pipeline_cache: vk::PipelineCache,
    pipeline: vk::Pipeline,
    sync: FrameSync,
}

/// Everything `Resources::build` reads besides the contexts.
struct BuildInputs<'a> {
    init: &'a DeviceInit,
    assets: &'a dyn AssetSource,
    mesh: &'a Mesh,
    camera: &'a Camera,
    window_extent: vk::Extent2D,
}

impl Resources {
    fn build(
        &mut self,
        inst: &InstanceContext,
        dev: &DeviceContext,
        input: &BuildInputs<'_>,
    ) -> Result<MvpTransform> {
        let device = &dev.device;
        let init = input.init;

        self.swapchain = Swapchain::new(inst, dev, init, input.window_extent)
            .context("init: swapchain")?;
        let extent = self.swapchain.extent;

        self.command_pool = commands::create_command_pool(device, dev.queue_family)
            .context("init: command pool")?;
        self.command_buffers = commands::allocate_command_buffers(
            device,
            self.command_pool,
            self.swapchain.image_count(),
        )
        .context("init: command buffers")?;

        self.depth
            .create(&inst.instance, dev, &init.depth_formats, extent)
            .context("init: depth buffer")?;

        let transform = MvpTransform::new(input.camera, extent.width, extent.height);
        self.uniform
            .create(
                dev,
                vk::BufferUsageFlags::UNIFORM_BUFFER,
                bytemuck::bytes_of(&transform.uniform_data()),
                "uniform",
            )
            .context("init: uniform buffer")?;

        self.set_layout = pipeline::create_descriptor_set_layout(device)
            .context("init: descriptor set layout")?;
        self.pipeline_layout = pipeline::create_pipeline_layout(device, self.set_layout)
            .context("init: pipeline layout")?;

        self.render_pass =
            pipeline::create_render_pass(device, self.swapchain.format, self.depth.format)
                .context("init: render pass")?;

        let vert = load_spirv(input.assets, &init.vertex_shader).context("init: shaders")?;
        self.vertex_shader = pipeline::create_shader_module(device, &vert, "vertex")
            .context("init: shaders")?;
        let frag = load_spirv(input.assets, &init.fragment_shader).context("init: shaders")?;
        self.fragment_shader = pipeline::create_shader_module(device, &frag, "fragment")
            .context("init: shaders")?;

        pipeline::create_framebuffers(
            device,
            self.render_pass,
            &self.swapchain.views,
            self.depth.view,
            extent,
            &mut self.framebuffers,
        )
        .context("init: framebuffers")?;

        self.vertex
            .create(
                dev,
                vk::BufferUsageFlags::VERTEX_BUFFER,
                input.mesh.vertex_bytes(),
                "vertex",
            )
            .context("init: vertex buffer")?;
        self.index
            .create(
                dev,
                vk::BufferUsageFlags::INDEX_BUFFER,
                input.mesh.index_bytes(),
                "index",
            )
            .context("init: index buffer")?;

        self.descriptor_pool =
            pipeline::create_descriptor_pool(device).context("init: descriptor pool")?;
        self.descriptor_set = pipeline::allocate_descriptor_set(
            device,
            self.descriptor_pool,
            self.set_layout,
            &self.uniform,
        )
        .context("init: descriptor set")?;

        self.pipeline_cache =
            pipeline::create_pipeline_cache(device).context("init: pipeline cache")?;
        self.pipeline = pipeline::create_graphics_pipeline(
            device,
            &PipelineDesc {
                layout: self.pipeline_layout,
                render_pass: self.render_pass,
                cache: self.pipeline_cache,
                vertex: self.vertex_shader,
                fragment: self.fragment_shader,
                extent,
            },
        )
        .context("init: graphics pipeline")?;

        commands::record_draws(
            device,
            &self.command_buffers,
            &DrawRecording {
                render_pass: self.render_pass,
                framebuffers: &self.framebuffers,
                extent,
                clear_color: init.clear_color,
                pipeline: self.pipeline,
                pipeline_layout: self.pipeline_layout,
                descriptor_set: self.descriptor_set,
                vertex_buffer: self.vertex.buffer,
                index_buffer: self.index.buffer,
                index_count: input.mesh.index_count(),
            },
        )
        .context("init: record command buffers")?;

        self.sync.create(device).context("init: synchronization objects")?;

        Ok(transform)
    }

    unsafe fn destroy(&mut self, dev: &DeviceContext) {
        let device = &dev.device;
        unsafe {
            self.sync.destroy(device);
            device.destroy_pipeline(self.pipeline, None);
            device.destroy_pipeline_cache(self.pipeline_cache, None);
            device.destroy_descriptor_pool(self.descriptor_pool, None);
            self.index.destroy(device);
            self.vertex.destroy(device);
            for fb in self.framebuffers.drain(..) {
                device.destroy_framebuffer(fb, None);
            }
            device.destroy_shader_module(self.fragment_shader, None);
            device.destroy_shader_module(self.vertex_shader, None);
            device.destroy_render_pass(self.render_pass, None);
            device.destroy_pipeline_layout(self.pipeline_layout, None);
            device.destroy_descriptor_set_layout(self.set_layout, None);
            self.uniform.destroy(device);
            self.depth.destroy(device);
            self.command_buffers.clear();
            device.destroy_command_pool(self.command_pool, None);
            self.swapchain.destroy(dev);
        }
        *self = Self::default();
    }
}

/// Vulkan rendering context for the teapot.
///
/// Owns every Vulkan object. Construction runs the full initialization sequence and
/// presents one frame; dropping waits for the device to go idle and destroys
/// everything in reverse creation order.
///
/// The window passed to [`VulkanDevice::new`] must outlive this value.
pub struct VulkanDevice {
    resources: Resources,
    transform: MvpTransform,
    clear_color: [f32; 4],
    budget: WaitBudget,
    index_count: u32,
    frames: u64,

    // Declared last: dropped after `Drop::drop` released `resources`.
    dev: DeviceContext,
    _inst: InstanceContext,
}

impl VulkanDevice {
    pub fn new<W>(
        window: &W,
        size: Extent,
        init: &DeviceInit,
        assets: &dyn AssetSource,
    ) -> Result<Self>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        let mesh = scene::teapot().context("init: teapot mesh")?;

        let inst = InstanceContext::new(&init.app_name, window).context("init: instance")?;
        let dev = DeviceContext::new(&inst).context("init: device")?;

        let mut resources = Resources::default();
        let inputs = BuildInputs {
            init,
            assets,
            mesh: &mesh,
            camera: &Camera::default(),
            window_extent: vk::Extent2D { width: size.width, height: size.height },
        };

        let transform = match resources.build(&inst, &dev, &inputs) {
            Ok(t) => t,
            Err(e) => {
                unsafe {
                    let _ = dev.device.device_wait_idle();
                    resources.destroy(&dev);
                }
                return Err(e);
            }
        };

        let mut this = Self {
            resources,
            transform,
            clear_color: init.clear_color,
            budget: WaitBudget {
                timeout_ns: init.fence_timeout_ns,
                attempts: init.max_wait_attempts,
            },
            index_count: mesh.index_count(),
            frames: 0,
            dev,
            _inst: inst,
        };

        this.draw().context("init: first present")?;
        log::info!(
            "device ready: {} swapchain images, {} indices, clear {:?}",
            this.resources.swapchain.image_count(),
            this.index_count,
            this.clear_color
        );

        Ok(this)
    }

    fn upload_transform(&self) -> Result<()> {
        self.resources
            .uniform
            .write(&self.dev.device, bytemuck::bytes_of(&self.transform.uniform_data()))
            .context("upload MVP")
    }
}

impl RenderDevice for VulkanDevice {
    fn is_ready(&self) -> bool {
        self.resources.pipeline != vk::Pipeline::null()
    }

    fn extent(&self) -> Extent {
        let e = self.resources.swapchain.extent;
        Extent::new(e.width, e.height)
    }

    fn rotation_degrees(&self) -> f32 {
        self.transform.angle_degrees()
    }

    fn rotate(&mut self, degrees: f32, mode: RotationMode) -> Result<()> {
        self.transform.rotate(degrees, mode);
        self.upload_transform()
    }

    fn draw(&mut self) -> Result<()> {
        let r = &self.resources;
        let index = frame::submit_frame(
            &self.dev,
            &r.swapchain,
            &r.sync,
            &r.command_buffers,
            self.budget,
        )?;
        self.frames += 1;
        log::trace!("frame {} presented image {index}", self.frames);
        Ok(())
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self.dev.device.device_wait_idle() {
                log::warn!("device_wait_idle on teardown: {e}");
            }
            self.resources.destroy(&self.dev);
        }
        log::info!("device destroyed after {} frames", self.frames);
    }
}
