//! Remote monitoring service access.
//!
//! # Data Flow
//! ```text
//! SyncEngine
//!     → RemoteGateway::find (list + name scan)
//!     → RemoteGateway::create / update / delete
//!
//! Implementations:
//!     client.rs  (HTTP, reqwest)
//!     memory.rs  (in-process, tests and dry runs)
//! ```
//!
//! # Design Decisions
//! - Every call distinguishes success, not-found and failure
//! - Connection settings are fixed at construction
//! - No caching: every call hits the remote

pub mod client;
pub mod memory;
pub mod types;

use std::future::Future;

use thiserror::Error;

pub use client::HttpGateway;
pub use memory::MemoryGateway;
pub use types::{CheckList, CheckPayload, RemoteCheckRecord};

/// Errors reported by a gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The addressed check does not exist.
    #[error("check not found")]
    NotFound,

    /// The remote answered with a status the operation does not expect.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected schema.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// The four operations the reconciler needs from the monitoring API.
///
/// Futures are `Send` so reconciliations can run on spawned tasks.
pub trait RemoteGateway: Send + Sync {
    /// First check whose name equals `name`; `Ok(None)` if there is none.
    fn find(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<RemoteCheckRecord>, GatewayError>> + Send;

    /// Create a check, returning the remote id when the service reports one.
    fn create(
        &self,
        payload: &CheckPayload,
    ) -> impl Future<Output = Result<Option<String>, GatewayError>> + Send;

    fn update(
        &self,
        id: &str,
        payload: &CheckPayload,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
