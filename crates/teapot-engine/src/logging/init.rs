use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "teapot_engine=debug"). On Android only the maximum level of the filter is
/// honoured and records go to logcat under `tag`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    pub tag: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            tag: "VulkanTeapot".to_string(),
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Call it first thing in `main` / `android_main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        install(config);
        log::debug!("logging initialized");
    });
}

#[cfg(not(target_os = "android"))]
fn install(config: LoggingConfig) {
    let mut builder = env_logger::Builder::new();

    if let Some(filter) = config.env_filter {
        builder.parse_filters(&filter);
    } else if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }

    builder.write_style(config.write_style);
    builder.init();
}

#[cfg(target_os = "android")]
fn install(config: LoggingConfig) {
    let level = config
        .env_filter
        .as_deref()
        .map(max_level)
        .unwrap_or(log::LevelFilter::Info);

    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(level)
            .with_tag(config.tag),
    );
}

/// Highest level named anywhere in an `env_logger`-style filter string.
///
/// Module-scoped directives are flattened; logcat filtering is done by tag.
#[cfg_attr(not(target_os = "android"), allow(dead_code))]
fn max_level(filter: &str) -> log::LevelFilter {
    filter
        .split(',')
        .filter_map(|directive| {
            let level = directive.rsplit('=').next()?.trim();
            level.parse::<log::LevelFilter>().ok()
        })
        .max()
        .unwrap_or(log::LevelFilter::Info)
}
