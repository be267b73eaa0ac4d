//! In-process gateway.
//!
//! Keeps checks in a vector and counts calls per operation. Failures can be
//! injected per operation. Used by tests and by `--dry-run`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::remote::types::{CheckPayload, RemoteCheckRecord};
use crate::remote::{GatewayError, RemoteGateway};

/// Gateway operations, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOp {
    Find,
    Create,
    Update,
    Delete,
}

impl MemoryOp {
    fn index(self) -> usize {
        match self {
            MemoryOp::Find => 0,
            MemoryOp::Create => 1,
            MemoryOp::Update => 2,
            MemoryOp::Delete => 3,
        }
    }
}

#[derive(Default)]
pub struct MemoryGateway {
    records: Mutex<Vec<RemoteCheckRecord>>,
    failing: Mutex<HashSet<MemoryOp>>,
    calls: [AtomicUsize; 4],
    next_id: AtomicU64,
    latency: Option<Duration>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `latency` before touching state.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make `op` fail with a 503 until `recover` is called.
    pub fn fail(&self, op: MemoryOp) {
        self.lock_failing().insert(op);
    }

    pub fn recover(&self, op: MemoryOp) {
        self.lock_failing().remove(&op);
    }

    /// Seed a record directly, bypassing call counters.
    pub fn insert(&self, record: RemoteCheckRecord) {
        self.lock_records().push(record);
    }

    pub fn records(&self) -> Vec<RemoteCheckRecord> {
        self.lock_records().clone()
    }

    pub fn calls(&self, op: MemoryOp) -> usize {
        self.calls[op.index()].load(Ordering::SeqCst)
    }

    /// Number of create, update and delete calls made so far.
    pub fn mutations(&self) -> usize {
        self.calls(MemoryOp::Create) + self.calls(MemoryOp::Update) + self.calls(MemoryOp::Delete)
    }

    async fn enter(&self, op: MemoryOp) -> Result<(), GatewayError> {
        self.calls[op.index()].fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.lock_failing().contains(&op) {
            return Err(GatewayError::Status {
                status: 503,
                body: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, Vec<RemoteCheckRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_failing(&self) -> std::sync::MutexGuard<'_, HashSet<MemoryOp>> {
        self.failing.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RemoteGateway for MemoryGateway {
    async fn find(&self, name: &str) -> Result<Option<RemoteCheckRecord>, GatewayError> {
        self.enter(MemoryOp::Find).await?;
        Ok(self
            .lock_records()
            .iter()
            .find(|record| record.name == name)
            .cloned())
    }

    async fn create(&self, payload: &CheckPayload) -> Result<Option<String>, GatewayError> {
        self.enter(MemoryOp::Create).await?;
        let id = format!("hc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.lock_records()
            .push(RemoteCheckRecord::from_payload(id.clone(), payload));
        Ok(Some(id))
    }

    async fn update(&self, id: &str, payload: &CheckPayload) -> Result<(), GatewayError> {
        self.enter(MemoryOp::Update).await?;
        let mut records = self.lock_records();
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(GatewayError::NotFound)?;
        *record = RemoteCheckRecord::from_payload(id, payload);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        self.enter(MemoryOp::Delete).await?;
        let mut records = self.lock_records();
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGateway")
            .field("records", &self.lock_records().len())
            .finish()
    }
}
