use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output formats.
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// Human-readable output
    Pretty,
    /// Structured JSON lines
    Json,
    /// Minimal single-line output
    Compact,
}

/// Initialize tracing for the server process.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false))
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_target(false))
                .init();
        }
    }
}
