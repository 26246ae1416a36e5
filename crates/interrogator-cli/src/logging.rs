//! Tracing initialization (SPEC_FULL.md §4.10).
//!
//! Grounded on `main.py`'s `configure_logging(config=config)` call made once at
//! process start, before any adapter or core component is constructed.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `tracing` subscriber. `level` is the configured log level
/// (`config.log_level`); it is used only as a fallback when `RUST_LOG` is unset,
/// mirroring the original's env-override-friendly logging config.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_target(true).init();
}
