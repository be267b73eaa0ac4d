//! Ingress health check sync agent.
//!
//! Keeps the monitoring service's health checks in sync with annotated
//! Kubernetes Ingresses.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   watch          ┌────────────┐   ResourceState   ┌────────────┐
//!   │ Kubernetes   │─────────────────▶│ controller │──────────────────▶│ finalizer  │
//!   │ Ingress watch│                  │  queue     │                   │ apply/clean│
//!   └──────────────┘                  └────────────┘                   └─────┬──────┘
//!                                                                            │
//!                                                                            ▼
//!   ┌──────────────┐  find/create/    ┌────────────┐   spec + lookup   ┌────────────┐
//!   │ Monitoring   │◀─update/delete───│  remote    │◀──────────────────│ sync engine│
//!   │ API          │                  │  gateway   │                   │            │
//!   └──────────────┘                  └────────────┘                   └────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use healthcheck_sync::config::{read_config, validated, AgentConfig, LogFormat, Overrides};
use healthcheck_sync::lifecycle::{signals, startup, Shutdown};
use healthcheck_sync::observability::logging;

#[derive(Parser)]
#[command(name = "healthcheck-sync", version)]
#[command(about = "Keeps monitoring health checks in sync with annotated Ingresses", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "HEALTHCHECK_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the monitoring API.
    #[arg(long, env = "APP_URL")]
    app_url: Option<String>,

    /// Bearer token for the monitoring API.
    #[arg(long, env = "APP_TOKEN", hide_env_values = true)]
    app_token: Option<String>,

    /// Only watch this namespace.
    #[arg(short, long)]
    namespace: Option<String>,

    /// Apply changes to an in-memory store instead of the monitoring API.
    #[arg(long)]
    dry_run: bool,

    #[arg(long, value_enum)]
    log_format: Option<LogFormatArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.app_url.clone(),
            token: self.app_token.clone(),
            namespace: self.namespace.clone(),
            dry_run: self.dry_run,
            log_format: self.log_format.map(|f| match f {
                LogFormatArg::Pretty => LogFormat::Pretty,
                LogFormatArg::Json => LogFormat::Json,
            }),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => AgentConfig::default(),
    };
    cli.overrides().apply(&mut config);
    let config = validated(config)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("healthcheck-sync v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        remote = %config.remote.collection_url(),
        annotation_prefix = %config.annotations.prefix,
        dry_run = config.controller.dry_run,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    startup::run(config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
