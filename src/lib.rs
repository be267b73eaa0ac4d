//! Ingress health check sync agent library.

pub mod config;
pub mod controller;
pub mod lifecycle;
pub mod observability;
pub mod remote;
pub mod resilience;
pub mod sync;

pub use config::schema::AgentConfig;
pub use lifecycle::Shutdown;
pub use sync::{ResourceState, SyncEngine, SyncError, SyncOutcome};
