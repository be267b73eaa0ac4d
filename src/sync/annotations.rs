//! Annotation extraction.
//!
//! Reads the declared health check fields off a resource's annotation map.
//! A missing key yields the empty string; extraction never fails.

use std::collections::BTreeMap;

/// Annotation prefix used when none is configured.
pub const DEFAULT_ANNOTATION_PREFIX: &str = "wenti.dev";

/// Recognized annotation keys, one per configurable check field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKey {
    Port,
    Protocol,
    Path,
    Method,
    SuccessCodes,
    Timeout,
    Interval,
}

impl AnnotationKey {
    pub const ALL: [AnnotationKey; 7] = [
        AnnotationKey::Port,
        AnnotationKey::Protocol,
        AnnotationKey::Path,
        AnnotationKey::Method,
        AnnotationKey::SuccessCodes,
        AnnotationKey::Timeout,
        AnnotationKey::Interval,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            AnnotationKey::Port => "health-check-port",
            AnnotationKey::Protocol => "health-check-protocol",
            AnnotationKey::Path => "health-check-path",
            AnnotationKey::Method => "health-check-method",
            AnnotationKey::SuccessCodes => "health-check-success-codes",
            AnnotationKey::Timeout => "health-check-timeout",
            AnnotationKey::Interval => "health-check-interval",
        }
    }

    /// Value used when the resource does not annotate this field.
    pub fn default_value(self) -> &'static str {
        match self {
            AnnotationKey::Port => "8080",
            AnnotationKey::Protocol => "http",
            AnnotationKey::Path => "/",
            AnnotationKey::Method => "GET",
            AnnotationKey::SuccessCodes => "200",
            AnnotationKey::Timeout => "30s",
            AnnotationKey::Interval => "60s",
        }
    }
}

/// Looks up prefixed annotation keys.
#[derive(Debug, Clone)]
pub struct AnnotationExtractor {
    prefix: String,
}

impl AnnotationExtractor {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_end_matches('/').to_string();
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full annotation name, e.g. `wenti.dev/health-check-port`.
    pub fn key_name(&self, key: AnnotationKey) -> String {
        format!("{}/{}", self.prefix, key.suffix())
    }

    /// Value of `key`, or `""` when absent.
    pub fn extract(&self, annotations: &BTreeMap<String, String>, key: AnnotationKey) -> String {
        annotations
            .get(&self.key_name(key))
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for AnnotationExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_ANNOTATION_PREFIX)
    }
}
