mod api;
mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use perch_auth::AuthStore;
use perch_clock::PunchClock;
use perch_sprints::SprintStore;

use crate::config::ServerConfig;
use crate::logging::{init_tracing, LogFormat};

#[derive(Parser, Debug)]
#[command(
    name = "perch",
    about = "Personal punch-clock and writing-sprint server",
    version,
    author
)]
struct Cli {
    /// Port to serve on (default: 8080)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the per-user log files (default: platform data dir)
    #[arg(short = 'd', long)]
    data_dir: Option<PathBuf>,

    /// Daily work-hours target used by the punch status report (default: 8)
    #[arg(long)]
    work_hours: Option<f64>,

    /// Path to the config file
    #[arg(long, default_value = "perch.toml")]
    config: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format.into());

    let file_config = ServerConfig::load(&cli.config)?.unwrap_or_default();
    let port = cli.port.or(file_config.port).unwrap_or(8080);
    let work_hours = cli.work_hours.or(file_config.work_hours).unwrap_or(8.0);
    let data_dir = match cli.data_dir.or(file_config.data_dir) {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    let clock = Arc::new(PunchClock::with_dir(data_dir.join("clock")));
    let sprints = Arc::new(SprintStore::with_dir(data_dir.join("sprints")));
    let auth = Arc::new(AuthStore::with_path(data_dir.join("auth").join("users.csv")));

    let router = api::create_router(clock, sprints, auth, work_hours);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind server to {addr}"))?;

    tracing::info!(
        "serving on {} with data dir {}",
        addr,
        data_dir.display()
    );
    eprintln!();
    eprintln!(
        "  {} {}",
        "->".bright_green(),
        format!("Listening on http://localhost:{port}").bold()
    );
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

fn default_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().with_context(|| "Could not determine data directory")?;
    Ok(data_dir.join("perch"))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
    eprintln!("\nShutting down...");
}
