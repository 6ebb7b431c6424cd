use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::assets::AssetSource;
use crate::core::{DeviceFactory, Extent};

use super::context::VulkanDevice;
use super::init::DeviceInit;

/// Creates a [`VulkanDevice`] for each window the shell receives.
pub struct VulkanFactory {
    init: DeviceInit,
    assets: Box<dyn AssetSource>,
}

impl VulkanFactory {
    pub fn new(init: DeviceInit, assets: impl AssetSource + 'static) -> Self {
        Self {
            init,
            assets: Box::new(assets),
        }
    }
}

impl<W> DeviceFactory<W> for VulkanFactory
where
    W: HasDisplayHandle + HasWindowHandle,
{
    type Device = VulkanDevice;

    fn create(&mut self, window: &W, size: Extent) -> Result<VulkanDevice> {
        VulkanDevice::new(window, size, &self.init, &*self.assets)
    }
}
