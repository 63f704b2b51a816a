//! Logger initialisation.
//!
//! Everything in the crate logs through the `log` facade; this module wires
//! the facade to `env_logger` exactly once per process.

use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "shader_ngin=debug,winit=warn"). When unset, `RUST_LOG` is consulted and
/// the level falls back to `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initialises the global logger once; later calls are ignored.
///
/// A logger installed by someone else (a test harness, an embedding app) wins
/// and is left alone.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.env_filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }
        builder.write_style(config.write_style);

        if let Err(e) = builder.try_init() {
            println!("Warning: Could not initialize logger: {}", e);
            return;
        }
        log::debug!("logging initialized");
    });
}
