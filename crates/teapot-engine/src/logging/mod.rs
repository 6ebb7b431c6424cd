//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else logs through the `log`
//! facade; the backend is `env_logger` on desktop and logcat on Android.

mod init;

pub use init::{init_logging, LoggingConfig};
