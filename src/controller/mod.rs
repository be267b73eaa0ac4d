//! Event delivery for the sync core.
//!
//! # Data Flow
//! ```text
//! Kubernetes API (watch Ingress)
//!     → reconciler.rs (kube Controller: per-object queue, concurrency bound)
//!     → finalizer Apply   → ingress.rs → Present
//!     → finalizer Cleanup → ingress.rs → Absent
//!     → SyncEngine::reconcile_until
//! failures → error_policy → RetryTracker + RetryPolicy backoff
//! ```
//!
//! # Design Decisions
//! - A finalizer keeps each Ingress until its remote check is deleted
//! - Same Ingress never reconciles concurrently; distinct Ingresses may
//! - Retry policy lives here, not in the sync core

pub mod ingress;
pub mod reconciler;

pub use reconciler::{error_policy, reconcile, Context, ReconcileError, RetryTracker, FINALIZER};
