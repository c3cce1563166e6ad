use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "metronome_engine=debug,wgpu=warn"). When absent, `RUST_LOG` is used,
/// then `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

/// Picks the filter string to install, or `None` to fall back to
/// `default_level`.
pub fn resolve_filter(config: &LoggingConfig, rust_log: Option<String>) -> Option<String> {
    config
        .env_filter
        .clone()
        .or(rust_log)
        .filter(|filter| !filter.trim().is_empty())
}

/// Initializes the global logger once.
///
/// Later calls are ignored, as is a logger installed by someone else.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match resolve_filter(&config, std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(config.default_level);
            }
        }

        // Frame timing is read in milliseconds.
        builder
            .write_style(config.write_style)
            .format_timestamp_millis();

        if builder.try_init().is_err() {
            log::warn!("a logger was already installed; keeping it");
            return;
        }

        log::debug!("logging initialized");
    });
}
