//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (platform loop) and the render
//! device, and the shell that forwards lifecycle and input events between them.

mod device;
mod shell;

pub use device::{DeviceFactory, Extent, RenderDevice};
pub use shell::{RedrawPolicy, Shell, ShellConfig};
