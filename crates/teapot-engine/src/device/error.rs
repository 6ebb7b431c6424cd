use anyhow::{bail, Context as _, Result};
use ash::prelude::VkResult;
use ash::vk;

/// Returns true for results that mean "not yet" rather than failure.
pub(crate) fn is_transient(result: vk::Result) -> bool {
    matches!(result, vk::Result::TIMEOUT | vk::Result::NOT_READY)
}

/// Calls `op` until it succeeds, retrying timeouts up to `attempts` times.
///
/// Any other error code is returned immediately with `what` as context.
pub(crate) fn retry_transient<T>(
    attempts: u32,
    what: &str,
    mut op: impl FnMut() -> VkResult<T>,
) -> Result<T> {
    let mut last = vk::Result::TIMEOUT;

    for attempt in 1..=attempts.max(1) {
        match op() {
            Ok(v) => return Ok(v),
            Err(r) if is_transient(r) => {
                log::debug!("{what}: {r:?} (attempt {attempt}/{attempts})");
                last = r;
            }
            Err(r) => return Err(r).with_context(|| what.to_owned()),
        }
    }

    bail!("{what}: still {last:?} after {attempts} attempts")
}
