#![forbid(unsafe_code)]

//! `quetzal-console` — terminal client binary.
//!
//! Bootstraps configuration and logging, checks for an existing session
//! credential, and runs the interactive converter console.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use quetzal_console::api::ApiClient;
use quetzal_console::config::AppConfig;
use quetzal_console::console;
use quetzal_console::session::SessionPolicy;
use quetzal_console::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "quetzal-console", about = "Quetzal/dollar converter console", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration file.
    #[arg(long)]
    base_url: Option<String>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("quetzal-console bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let config = load_config(&args)?;
    info!(base_url = %config.api_base_url, "configuration loaded");

    let api = Arc::new(ApiClient::new(&config.api_base_url)?);
    console::run(api, SessionPolicy::default()).await
}

/// Resolve configuration from `--config`, with `--base-url` taking
/// precedence when both are given.
fn load_config(args: &Cli) -> Result<AppConfig> {
    if let Some(base_url) = &args.base_url {
        return AppConfig::from_base_url(base_url);
    }
    match &args.config {
        Some(path) => AppConfig::load_from_path(path),
        None => Err(AppError::Config(
            "provide --config <file> or --base-url <url>".into(),
        )),
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so they do not interleave with the interactive
    // screens on stdout.
    let subscriber = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
