use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "tiny_renderer=debug,wgpu=warn"). When unset, `RUST_LOG` is used, and
/// without that everything at `info` and above is shown with wgpu's own
/// chatter kept to warnings.
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

impl LoggingConfig {
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder
                    .filter_level(log::LevelFilter::Info)
                    .filter_module("wgpu_core", log::LevelFilter::Warn)
                    .filter_module("wgpu_hal", log::LevelFilter::Warn)
                    .filter_module("naga", log::LevelFilter::Warn);
            }
        }

        builder.write_style(config.write_style);

        // Another logger may already be installed (e.g. by a test harness).
        if builder.try_init().is_err() {
            log::debug!("global logger already set");
            return;
        }

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::default().filter("debug"));
        init_logging(LoggingConfig::default());
        log::info!("still logging");
    }
}
