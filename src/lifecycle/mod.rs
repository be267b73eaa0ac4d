//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Metrics → Gateway + engine → Ingress controller
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop scheduling → Cancel in-flight reconciliations → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then remote client, then watch
//! - A cancelled reconciliation is simply re-run by the next process

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
