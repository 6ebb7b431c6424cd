//! Vulkan device and swapchain management.
//!
//! This module is responsible for:
//! - creating the Vulkan instance, surface, physical/logical device and queue
//! - building the swapchain, depth target, buffers and the graphics pipeline
//! - replaying the pre-recorded command buffers and presenting

mod buffer;
mod commands;
mod context;
mod depth;
mod error;
mod factory;
mod frame;
mod init;
mod instance;
mod logical;
mod memory;
mod pipeline;
mod swapchain;

pub use context::VulkanDevice;
pub use factory::VulkanFactory;
pub use init::DeviceInit;
pub use memory::find_memory_type;
