//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Build the gateway and sync engine from validated configuration
//! - Connect to Kubernetes and run the Ingress controller until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The watch starts last, once the gateway is ready

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;

use crate::config::AgentConfig;
use crate::controller::{reconciler, Context};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::remote::{GatewayError, HttpGateway, MemoryGateway, RemoteGateway};
use crate::sync::{AnnotationExtractor, DesiredSpecBuilder, SyncEngine};

/// Errors that prevent the agent from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build monitoring API client: {0}")]
    Gateway(#[from] GatewayError),

    #[error("failed to connect to Kubernetes: {0}")]
    Kube(#[from] kube::Error),
}

/// Spec builder for the configured annotation prefix.
pub fn spec_builder(config: &AgentConfig) -> DesiredSpecBuilder {
    DesiredSpecBuilder::new(AnnotationExtractor::new(config.annotations.prefix.as_str()))
}

/// Run the agent until `shutdown` fires.
pub async fn run(config: AgentConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let builder = spec_builder(&config);

    if config.controller.dry_run {
        tracing::warn!("Dry run: remote changes are applied to an in-memory store only");
        return watch_and_sync(MemoryGateway::new(), builder, &config, shutdown).await;
    }

    let gateway = HttpGateway::new(&config.remote)?;
    tracing::info!(gateway = ?gateway, "Monitoring API client ready");
    watch_and_sync(gateway, builder, &config, shutdown).await
}

async fn watch_and_sync<G: RemoteGateway + 'static>(
    gateway: G,
    builder: DesiredSpecBuilder,
    config: &AgentConfig,
    shutdown: Shutdown,
) -> Result<(), StartupError> {
    let client = kube::Client::try_default().await?;
    tracing::info!(
        namespace = config.controller.namespace.as_deref().unwrap_or("<all>"),
        max_concurrent = config.controller.max_concurrent,
        resync_secs = config.controller.resync_interval_secs,
        "Watching ingresses"
    );

    let finalizer_client = (!config.controller.dry_run).then(|| client.clone());
    let ctx = Arc::new(Context::new(
        SyncEngine::new(gateway, builder),
        finalizer_client,
        &config.controller,
        shutdown,
    ));
    reconciler::run(client, &config.controller, ctx).await;
    Ok(())
}
