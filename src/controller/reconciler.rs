//! Ingress controller.
//!
//! # Responsibilities
//! - Feed every Ingress in scope through the sync engine
//! - Hold a finalizer on each Ingress until its remote check is deleted
//! - Re-queue failed reconciliations with backoff, per Ingress
//! - Periodically re-reconcile healthy Ingresses to heal remote drift
//!
//! # Design Decisions
//! - Per-object serialization, coalescing and the concurrency bound come from
//!   `kube::runtime::Controller`
//! - Spec errors wait for the next change of the Ingress
//! - Dry runs never patch Ingresses, so they skip the finalizer

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use k8s_openapi::api::networking::v1::Ingress;
use kube::runtime::controller::{self, Action};
use kube::runtime::finalizer::{self, finalizer};
use kube::runtime::{watcher, Controller};
use kube::{Api, Client};
use thiserror::Error;

use crate::config::ControllerConfig;
use crate::controller::ingress::{finalizer_state, identity_of, observed_state};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::remote::RemoteGateway;
use crate::resilience::RetryPolicy;
use crate::sync::{ResourceState, SyncEngine, SyncError, SyncKey};

/// Finalizer placed on every reconciled Ingress.
pub const FINALIZER: &str = "wenti.dev/healthcheck-sync";

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("ingress has no name")]
    Unnamed,

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("finalizer: {0}")]
    Finalizer(#[source] Box<finalizer::Error<SyncError>>),
}

impl ReconcileError {
    /// Sync core error behind this failure, if any.
    pub fn sync_error(&self) -> Option<&SyncError> {
        match self {
            ReconcileError::Sync(e) => Some(e),
            ReconcileError::Finalizer(e) => match e.as_ref() {
                finalizer::Error::ApplyFailed(e) | finalizer::Error::CleanupFailed(e) => Some(e),
                _ => None,
            },
            ReconcileError::Unnamed => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        if let Some(e) = self.sync_error() {
            return e.is_retryable();
        }
        match self {
            ReconcileError::Finalizer(e) => matches!(
                e.as_ref(),
                finalizer::Error::AddFinalizer(_) | finalizer::Error::RemoveFinalizer(_)
            ),
            _ => false,
        }
    }
}

/// Consecutive failures per Ingress, reset on success.
#[derive(Debug, Default)]
pub struct RetryTracker {
    attempts: Mutex<HashMap<SyncKey, u32>>,
}

impl RetryTracker {
    /// Count one more failure for `key`, returning the new attempt number.
    pub fn increment(&self, key: &SyncKey) -> u32 {
        let mut attempts = self.lock();
        let attempt = attempts.entry(key.clone()).or_insert(0);
        *attempt += 1;
        *attempt
    }

    pub fn reset(&self, key: &SyncKey) {
        self.lock().remove(key);
    }

    pub fn attempts(&self, key: &SyncKey) -> u32 {
        self.lock().get(key).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SyncKey, u32>> {
        self.attempts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Shared state handed to every reconciliation.
pub struct Context<G> {
    pub engine: SyncEngine<G>,
    /// Client used to manage the finalizer; `None` skips it.
    pub finalizer_client: Option<Client>,
    pub retries: RetryTracker,
    pub policy: RetryPolicy,
    pub resync: Duration,
    pub shutdown: Shutdown,
}

impl<G: RemoteGateway> Context<G> {
    pub fn new(
        engine: SyncEngine<G>,
        finalizer_client: Option<Client>,
        config: &ControllerConfig,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            engine,
            finalizer_client,
            retries: RetryTracker::default(),
            policy: RetryPolicy::from(config),
            resync: Duration::from_secs(config.resync_interval_secs),
            shutdown,
        }
    }

    async fn sync(&self, state: &ResourceState) -> Result<Action, SyncError> {
        self.engine
            .reconcile_until(state, self.shutdown.signalled())
            .await?;
        Ok(match state {
            ResourceState::Present(_) => Action::requeue(self.resync),
            ResourceState::Absent(_) => Action::await_change(),
        })
    }
}

/// Converge the remote check of one Ingress.
pub async fn reconcile<G: RemoteGateway + 'static>(
    ingress: Arc<Ingress>,
    ctx: Arc<Context<G>>,
) -> Result<Action, ReconcileError> {
    let identity = identity_of(&ingress).ok_or(ReconcileError::Unnamed)?;
    let key = identity.sync_key();

    let action = match &ctx.finalizer_client {
        Some(client) => {
            let api: Api<Ingress> = Api::namespaced(client.clone(), &identity.namespace);
            let ctx = ctx.as_ref();
            finalizer(&api, FINALIZER, ingress, |event| async move {
                match finalizer_state(event) {
                    Some(state) => ctx.sync(&state).await,
                    None => Ok(Action::await_change()),
                }
            })
            .await
            .map_err(|e| ReconcileError::Finalizer(Box::new(e)))?
        }
        None => {
            let state = observed_state(&ingress).ok_or(ReconcileError::Unnamed)?;
            ctx.sync(&state).await?
        }
    };

    ctx.retries.reset(&key);
    Ok(action)
}

/// Decide when to look at a failed Ingress again.
pub fn error_policy<G: RemoteGateway>(
    ingress: Arc<Ingress>,
    error: &ReconcileError,
    ctx: Arc<Context<G>>,
) -> Action {
    let key = identity_of(&ingress).map(|identity| identity.sync_key());
    let name = key.as_ref().map(SyncKey::as_str).unwrap_or("unknown");

    if matches!(error.sync_error(), Some(SyncError::Cancelled)) {
        tracing::debug!(sync_key = %name, "Reconciliation cancelled");
        return Action::await_change();
    }

    if !error.is_retryable() {
        tracing::error!(sync_key = %name, error = %error, "Reconciliation failed, waiting for resource change");
        if let Some(key) = &key {
            ctx.retries.reset(key);
        }
        return Action::await_change();
    }

    let attempt = key.as_ref().map(|key| ctx.retries.increment(key)).unwrap_or(1);
    let delay = ctx.policy.delay(attempt);
    tracing::warn!(
        sync_key = %name,
        attempt = attempt,
        delay_ms = delay.as_millis() as u64,
        error = %error,
        "Reconciliation failed, retrying"
    );
    metrics::record_retry_scheduled();
    Action::requeue(delay)
}

/// Run the Ingress controller until `shutdown` fires.
pub async fn run<G: RemoteGateway + 'static>(
    client: Client,
    config: &ControllerConfig,
    ctx: Arc<Context<G>>,
) {
    let ingresses: Api<Ingress> = match config.namespace.as_deref() {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    };
    let concurrency = u16::try_from(config.max_concurrent).unwrap_or(u16::MAX);
    let shutdown = ctx.shutdown.signalled();

    Controller::new(ingresses, watcher::Config::default())
        .with_config(controller::Config::default().concurrency(concurrency))
        .graceful_shutdown_on(shutdown)
        .run(reconcile::<G>, error_policy::<G>, ctx)
        .for_each(|result| async move {
            match result {
                Ok((obj, _action)) => {
                    tracing::debug!(ingress = %obj, "Ingress reconciled");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Ingress controller error");
                }
            }
        })
        .await;

    tracing::info!("Ingress controller stopped");
}
