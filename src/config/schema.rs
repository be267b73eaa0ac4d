//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the agent.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::sync::annotations::DEFAULT_ANNOTATION_PREFIX;

/// Root configuration for the sync agent.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AgentConfig {
    /// Monitoring API connection settings.
    pub remote: RemoteConfig,

    /// Annotation naming.
    pub annotations: AnnotationConfig,

    /// Watch and scheduling settings.
    pub controller: ControllerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Monitoring API connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the monitoring service (e.g., "https://api.example.com").
    pub base_url: String,

    /// Bearer token sent with every request.
    pub token: String,

    /// Path prefix in front of `/healthchecks`.
    pub api_prefix: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl RemoteConfig {
    /// URL of the health check collection.
    pub fn collection_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}/healthchecks", base)
        } else {
            format!("{}/{}/healthchecks", base, prefix)
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: String::new(),
            api_prefix: "/api/v1".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// Annotation naming.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Prefix of recognized annotation keys (e.g., "wenti.dev").
    pub prefix: String,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_ANNOTATION_PREFIX.to_string(),
        }
    }
}

/// Watch and scheduling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Only watch this namespace; all namespaces when unset.
    pub namespace: Option<String>,

    /// Maximum reconciliations running at once (distinct Ingresses).
    pub max_concurrent: usize,

    /// Base delay before re-running a failed reconciliation, in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Upper bound for the retry delay, in milliseconds.
    pub retry_max_delay_ms: u64,

    /// Re-reconcile healthy Ingresses this often, in seconds.
    pub resync_interval_secs: u64,

    /// Use an in-memory gateway instead of the remote API and leave
    /// Ingress finalizers untouched.
    pub dry_run: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            max_concurrent: 4,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 300_000,
            resync_interval_secs: 300,
            dry_run: false,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
