//! Remote check lookup.
//!
//! Resolves a `SyncKey` to the remote record stored under that name. A failed
//! lookup is an error, never "not found": treating an outage as absence would
//! create a duplicate check on the next step.

use crate::remote::{RemoteCheckRecord, RemoteGateway};
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::identity::SyncKey;

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(RemoteCheckRecord),
    NotFound,
}

impl Lookup {
    pub fn remote_id(&self) -> Option<&str> {
        match self {
            Lookup::Found(record) => Some(record.id.as_str()),
            Lookup::NotFound => None,
        }
    }
}

pub struct RemoteLocator<'a, G> {
    gateway: &'a G,
}

impl<'a, G: RemoteGateway> RemoteLocator<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    pub async fn locate(&self, key: &SyncKey) -> SyncResult<Lookup> {
        tracing::debug!(sync_key = %key, "Looking up remote health check");
        match self.gateway.find(key.as_str()).await {
            Ok(Some(record)) => {
                tracing::debug!(sync_key = %key, remote_id = %record.id, "Remote health check found");
                Ok(Lookup::Found(record))
            }
            Ok(None) => Ok(Lookup::NotFound),
            Err(source) => Err(SyncError::LookupFailed {
                key: key.to_string(),
                source,
            }),
        }
    }
}
