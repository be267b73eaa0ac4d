//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Reconciliation fails with a retryable error:
//!     → controller error policy asks backoff.rs for the delay of attempt N
//!     → the Ingress is requeued after the delay; a newer event runs sooner
//! ```
//!
//! # Design Decisions
//! - The sync core never retries; only the controller re-queues work
//! - Spec errors (bad annotations, no rules) are not retried

pub mod backoff;

pub use backoff::{calculate_backoff, RetryPolicy};
