//! Teapot engine crate.
//!
//! This crate owns the platform + Vulkan runtime pieces of the teapot viewer:
//! the device/context that builds and replays the rendering, the shell that
//! forwards lifecycle and input events to it, and the winit loop that drives both.

pub mod assets;
pub mod config;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod scene;
pub mod window;
