//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! sync engine and controller produce:
//!     → logging.rs (structured log events, one span per reconciliation)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON or pretty)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every reconciliation carries `sync_key` and a `reconcile_id` in its span
//! - Metrics are cheap and no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
