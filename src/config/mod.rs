//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI flags override file values
//!     → validation.rs (semantic checks)
//!     → AgentConfig (validated, immutable)
//!     → moved into gateway, engine and controller at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, validated, ConfigError, Overrides};
pub use schema::AgentConfig;
pub use schema::AnnotationConfig;
pub use schema::ControllerConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::RemoteConfig;
