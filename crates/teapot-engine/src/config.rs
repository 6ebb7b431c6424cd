//! Viewer configuration: defaults plus environment overrides.

use anyhow::{Context as _, Result};

use crate::core::ShellConfig;
use crate::device::DeviceInit;
use crate::logging::LoggingConfig;
use crate::window::RuntimeConfig;

/// Selects when frames are drawn: `never`, `on-demand` or `continuous`.
pub const ENV_REDRAW: &str = "TEAPOT_REDRAW";

/// Selects how drags rotate the model: `replace` or `accumulate`.
pub const ENV_ROTATION: &str = "TEAPOT_ROTATION";

/// Everything needed to start the viewer.
#[derive(Debug, Clone, Default)]
pub struct ViewerConfig {
    pub logging: LoggingConfig,
    pub runtime: RuntimeConfig,
    pub shell: ShellConfig,
    pub device: DeviceInit,
}

impl ViewerConfig {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies overrides from `lookup`; unset keys keep their current value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup(ENV_REDRAW) {
            self.shell.redraw = v.parse().with_context(|| format!("{ENV_REDRAW}={v}"))?;
        }
        if let Some(v) = lookup(ENV_ROTATION) {
            self.shell.rotation = v.parse().with_context(|| format!("{ENV_ROTATION}={v}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::core::RedrawPolicy;
    use crate::scene::RotationMode;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_sample() {
        let c = ViewerConfig::default();
        assert_eq!(c.shell.redraw, RedrawPolicy::OnDemand);
        assert_eq!(c.shell.rotation, RotationMode::Replace);
        assert_eq!(c.device.fence_timeout_ns, 100_000_000);
        assert_eq!(c.device.clear_color, [0.2; 4]);
        assert_eq!(c.device.vertex_shader, "shaders/shape.vert.spv");
    }

    #[test]
    fn overrides_apply() {
        let mut c = ViewerConfig::default();
        c.apply_overrides(env(&[(ENV_REDRAW, "continuous"), (ENV_ROTATION, "accumulate")]))
            .unwrap();
        assert_eq!(c.shell.redraw, RedrawPolicy::Continuous);
        assert_eq!(c.shell.rotation, RotationMode::Accumulate);
    }

    #[test]
    fn unset_keys_keep_defaults() {
        let mut c = ViewerConfig::default();
        c.apply_overrides(env(&[])).unwrap();
        assert_eq!(c.shell, ShellConfig::default());
    }

    #[test]
    fn bad_value_names_variable() {
        let mut c = ViewerConfig::default();
        let err = c.apply_overrides(env(&[(ENV_REDRAW, "always")])).unwrap_err();
        assert!(format!("{err:#}").contains(ENV_REDRAW));
    }
}
