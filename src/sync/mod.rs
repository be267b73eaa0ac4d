//! Reconciliation core.
//!
//! # Data Flow
//! ```text
//! ResourceState (from trigger)
//!     → annotations.rs (read declared fields)
//!     → spec.rs (DesiredCheckSpec + defaults, payload conversion)
//!     → locator.rs (find remote check by SyncKey)
//!     → engine.rs (create / update / delete / no-op)
//! ```
//!
//! # Design Decisions
//! - Identity is the SyncKey `<namespace>_<name>`, matched against the remote name
//! - No state survives a reconciliation; every run re-queries the remote
//! - Lookup failure is an error, distinct from "not found"

pub mod annotations;
pub mod engine;
pub mod error;
pub mod identity;
pub mod locator;
pub mod spec;

pub use annotations::{AnnotationExtractor, AnnotationKey};
pub use engine::{SyncEngine, SyncOutcome};
pub use error::{Operation, SyncError, SyncResult};
pub use identity::{ResourceIdentity, ResourceState, RoutingResource, SyncKey};
pub use locator::{Lookup, RemoteLocator};
pub use spec::{DesiredCheckSpec, DesiredSpecBuilder};
