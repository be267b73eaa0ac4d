//! Convergence state machine.
//!
//! # State Transitions
//! ```text
//! Present: build spec → convert payload → locate
//!     Found(id)  → update(id)  → Updated
//!     NotFound   → create      → Created
//! Absent: locate
//!     Found(id)  → delete(id)  → Deleted
//!     NotFound   →               NoOp
//! LookupFailed anywhere → error, no mutation
//! ```
//!
//! Every mutation is preceded by a fresh lookup, so any branch is safe to
//! re-run. The engine never retries on its own; the caller re-schedules.

use std::fmt;
use std::future::Future;
use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use crate::observability::metrics;
use crate::remote::{CheckPayload, GatewayError, RemoteGateway};
use crate::sync::error::{Operation, SyncError, SyncResult};
use crate::sync::identity::{ResourceIdentity, ResourceState, RoutingResource};
use crate::sync::locator::{Lookup, RemoteLocator};
use crate::sync::spec::DesiredSpecBuilder;

/// What a reconciliation did to the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
    Deleted,
    NoOp,
}

impl SyncOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncOutcome::Created => "created",
            SyncOutcome::Updated => "updated",
            SyncOutcome::Deleted => "deleted",
            SyncOutcome::NoOp => "no-op",
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct SyncEngine<G> {
    gateway: G,
    builder: DesiredSpecBuilder,
}

impl<G: RemoteGateway> SyncEngine<G> {
    pub fn new(gateway: G, builder: DesiredSpecBuilder) -> Self {
        Self { gateway, builder }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn builder(&self) -> &DesiredSpecBuilder {
        &self.builder
    }

    /// Run one reconciliation, aborting with `Cancelled` once `cancel` resolves.
    pub async fn reconcile_until<F>(&self, state: &ResourceState, cancel: F) -> SyncResult<SyncOutcome>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                tracing::info!(sync_key = %state.sync_key(), "Reconciliation cancelled");
                metrics::record_reconcile_error(SyncError::Cancelled.kind());
                Err(SyncError::Cancelled)
            }
            result = self.reconcile(state) => result,
        }
    }

    /// Converge the remote check for `state`.
    pub async fn reconcile(&self, state: &ResourceState) -> SyncResult<SyncOutcome> {
        let key = state.sync_key();
        let span = tracing::info_span!(
            "reconcile",
            sync_key = %key,
            reconcile_id = %Uuid::new_v4(),
        );

        async move {
            let start = Instant::now();
            let result = match state {
                ResourceState::Present(resource) => self.converge_present(resource).await,
                ResourceState::Absent(identity) => self.converge_absent(identity).await,
            };

            match &result {
                Ok(outcome) => {
                    tracing::info!(outcome = %outcome, "Health check reconciled");
                    metrics::record_reconcile(outcome.as_str(), start);
                }
                Err(e) => {
                    tracing::warn!(error = %e, kind = e.kind(), "Reconciliation failed");
                    metrics::record_reconcile_error(e.kind());
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn converge_present(&self, resource: &RoutingResource) -> SyncResult<SyncOutcome> {
        let key = resource.identity.sync_key();
        let spec = self.builder.build_for(resource)?;
        let payload = CheckPayload::try_from(&spec)?;

        match RemoteLocator::new(&self.gateway).locate(&key).await? {
            Lookup::Found(record) => {
                tracing::debug!(remote_id = %record.id, host = %payload.target, "Updating health check");
                self.gateway
                    .update(&record.id, &payload)
                    .await
                    .map_err(|source| mutation_failed(Operation::Update, &key, source))?;
                Ok(SyncOutcome::Updated)
            }
            Lookup::NotFound => {
                tracing::debug!(host = %payload.target, "Health check does not exist, creating it");
                let id = self
                    .gateway
                    .create(&payload)
                    .await
                    .map_err(|source| mutation_failed(Operation::Create, &key, source))?;
                if let Some(id) = id {
                    tracing::debug!(remote_id = %id, "Health check created");
                }
                Ok(SyncOutcome::Created)
            }
        }
    }

    async fn converge_absent(&self, identity: &ResourceIdentity) -> SyncResult<SyncOutcome> {
        let key = identity.sync_key();

        let record = match RemoteLocator::new(&self.gateway).locate(&key).await? {
            Lookup::Found(record) => record,
            Lookup::NotFound => {
                tracing::debug!("No health check to delete");
                return Ok(SyncOutcome::NoOp);
            }
        };

        match self.gateway.delete(&record.id).await {
            Ok(()) => Ok(SyncOutcome::Deleted),
            Err(GatewayError::NotFound) => {
                tracing::debug!(remote_id = %record.id, "Health check vanished before delete");
                Ok(SyncOutcome::NoOp)
            }
            Err(source) => Err(mutation_failed(Operation::Delete, &key, source)),
        }
    }
}

fn mutation_failed(operation: Operation, key: &impl fmt::Display, source: GatewayError) -> SyncError {
    SyncError::MutationFailed {
        operation,
        key: key.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::remote::memory::{MemoryGateway, MemoryOp};
    use crate::remote::RemoteCheckRecord;

    fn engine() -> SyncEngine<MemoryGateway> {
        SyncEngine::new(MemoryGateway::new(), DesiredSpecBuilder::default())
    }

    fn present(host: Option<&str>) -> ResourceState {
        ResourceState::Present(RoutingResource {
            identity: ResourceIdentity::new("ns", "foo"),
            annotations: BTreeMap::new(),
            first_rule_host: host.map(str::to_string),
        })
    }

    fn absent() -> ResourceState {
        ResourceState::Absent(ResourceIdentity::new("ns", "foo"))
    }

    #[tokio::test]
    async fn test_create_then_update() {
        let engine = engine();
        let state = present(Some("foo.example.com"));

        assert_eq!(engine.reconcile(&state).await.unwrap(), SyncOutcome::Created);
        assert_eq!(engine.reconcile(&state).await.unwrap(), SyncOutcome::Updated);

        let records = engine.gateway().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "ns_foo");
        assert_eq!(records[0].target, "foo.example.com");
        assert_eq!(records[0].timeout, 30);
    }

    #[tokio::test]
    async fn test_delete_paths() {
        let engine = engine();

        assert_eq!(engine.reconcile(&absent()).await.unwrap(), SyncOutcome::NoOp);
        assert_eq!(engine.gateway().mutations(), 0);

        engine.reconcile(&present(Some("foo.example.com"))).await.unwrap();
        assert_eq!(engine.reconcile(&absent()).await.unwrap(), SyncOutcome::Deleted);
        assert!(engine.gateway().records().is_empty());
        assert_eq!(engine.reconcile(&absent()).await.unwrap(), SyncOutcome::NoOp);
    }

    #[tokio::test]
    async fn test_invalid_spec_makes_no_calls() {
        let engine = engine();
        let err = engine.reconcile(&present(None)).await.unwrap_err();

        assert!(matches!(err, SyncError::InvalidSpec { .. }));
        assert_eq!(engine.gateway().calls(MemoryOp::Find), 0);
        assert_eq!(engine.gateway().mutations(), 0);
    }

    #[tokio::test]
    async fn test_conversion_failure_makes_no_calls() {
        let engine = engine();
        let mut annotations = BTreeMap::new();
        annotations.insert("wenti.dev/health-check-timeout".to_string(), "abc".to_string());
        let state = ResourceState::Present(RoutingResource {
            identity: ResourceIdentity::new("ns", "foo"),
            annotations,
            first_rule_host: Some("foo.example.com".to_string()),
        });

        let err = engine.reconcile(&state).await.unwrap_err();
        assert!(matches!(err, SyncError::ConversionFailed { field: "timeout", .. }));
        assert_eq!(engine.gateway().calls(MemoryOp::Find), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_blocks_mutation() {
        let engine = engine();
        engine.gateway().fail(MemoryOp::Find);

        let err = engine.reconcile(&present(Some("foo.example.com"))).await.unwrap_err();
        assert!(matches!(err, SyncError::LookupFailed { .. }));

        let err = engine.reconcile(&absent()).await.unwrap_err();
        assert!(matches!(err, SyncError::LookupFailed { .. }));
        assert_eq!(engine.gateway().mutations(), 0);
    }

    #[tokio::test]
    async fn test_mutation_failure_propagates() {
        let engine = engine();
        engine.gateway().fail(MemoryOp::Create);

        let err = engine.reconcile(&present(Some("foo.example.com"))).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::MutationFailed { operation: Operation::Create, .. }
        ));
        assert!(err.is_retryable());

        engine.gateway().recover(MemoryOp::Create);
        assert_eq!(
            engine.reconcile(&present(Some("foo.example.com"))).await.unwrap(),
            SyncOutcome::Created
        );
    }

    #[tokio::test]
    async fn test_update_uses_found_id() {
        let engine = engine();
        engine.gateway().insert(RemoteCheckRecord {
            id: "existing".into(),
            name: "ns_foo".into(),
            target: "old.example.com".into(),
            ..Default::default()
        });

        let outcome = engine.reconcile(&present(Some("new.example.com"))).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Updated);

        let records = engine.gateway().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "existing");
        assert_eq!(records[0].target, "new.example.com");
    }

    #[tokio::test]
    async fn test_cancel_before_completion() {
        let engine = SyncEngine::new(
            MemoryGateway::new().with_latency(std::time::Duration::from_secs(60)),
            DesiredSpecBuilder::default(),
        );

        let err = engine
            .reconcile_until(&present(Some("foo.example.com")), async {})
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Cancelled));
        assert_eq!(engine.gateway().mutations(), 0);
    }
}
