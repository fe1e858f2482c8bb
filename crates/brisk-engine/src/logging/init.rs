use std::sync::OnceLock;

use log::LevelFilter;

/// Crates that log per-frame detail at `info` and drown out the renderer.
const NOISY_CRATES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// `env_logger` setup used by [`init_logging`].
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter in `env_logger` syntax, e.g. `"brisk_engine=trace"`.
    /// When unset, `RUST_LOG` is read, then `level` applies.
    pub env_filter: Option<String>,
    pub level: LevelFilter,
    /// Caps wgpu and naga at `warn` unless a filter names them.
    pub quiet_gpu_crates: bool,
    pub millis_timestamps: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            level: LevelFilter::Info,
            quiet_gpu_crates: true,
            millis_timestamps: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Installs the global logger on first call; later calls return the first outcome.
///
/// Returns `false` if another logger was already registered with `log`.
pub fn init_logging(config: LoggingConfig) -> bool {
    *INSTALLED.get_or_init(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(config.level);

        if config.quiet_gpu_crates {
            for name in NOISY_CRATES {
                builder.filter_module(name, LevelFilter::Warn);
            }
        }

        // Explicit filters are parsed last so they override the defaults above.
        if let Some(filter) = config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            builder.parse_filters(&filter);
        }

        if config.millis_timestamps {
            builder.format_timestamp_millis();
        }
        builder.write_style(config.write_style);

        let installed = builder.try_init().is_ok();
        if installed {
            log::debug!("logger installed");
        }
        installed
    })
}
