//! Desired check specification.
//!
//! # Responsibilities
//! - Combine identity, first rule host and annotations into a `DesiredCheckSpec`
//! - Apply defaults for fields the resource does not annotate
//! - Convert the spec to the wire payload, validating numeric fields
//!
//! # Design Decisions
//! - Present-but-empty annotations count as absent, so the default applies
//! - Conversion happens before any remote call
//! - Durations accept a bare number of seconds or a `humantime` duration

use std::collections::BTreeMap;

use crate::remote::CheckPayload;
use crate::sync::annotations::{AnnotationExtractor, AnnotationKey};
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::identity::{ResourceIdentity, RoutingResource};

/// Declared intent for one resource's remote check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredCheckSpec {
    pub name: String,
    pub description: String,
    pub target: String,
    pub port: String,
    pub protocol: String,
    pub path: String,
    pub method: String,
    pub http_code: String,
    pub timeout: String,
    pub interval: String,
    pub enabled: bool,
}

/// Builds `DesiredCheckSpec` values from routing resources.
#[derive(Debug, Clone, Default)]
pub struct DesiredSpecBuilder {
    extractor: AnnotationExtractor,
}

impl DesiredSpecBuilder {
    pub fn new(extractor: AnnotationExtractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &AnnotationExtractor {
        &self.extractor
    }

    pub fn build_for(&self, resource: &RoutingResource) -> SyncResult<DesiredCheckSpec> {
        self.build(
            &resource.identity,
            resource.first_rule_host.as_deref(),
            &resource.annotations,
        )
    }

    /// Build the spec for `identity`.
    ///
    /// Fails with `InvalidSpec` when no non-empty first rule host exists.
    pub fn build(
        &self,
        identity: &ResourceIdentity,
        first_rule_host: Option<&str>,
        annotations: &BTreeMap<String, String>,
    ) -> SyncResult<DesiredCheckSpec> {
        let key = identity.sync_key();

        let target = match first_rule_host.map(str::trim) {
            Some(host) if !host.is_empty() => host.to_string(),
            Some(_) => {
                return Err(SyncError::InvalidSpec {
                    key: key.to_string(),
                    reason: "first routing rule has no host".to_string(),
                })
            }
            None => {
                return Err(SyncError::InvalidSpec {
                    key: key.to_string(),
                    reason: "resource declares no routing rules".to_string(),
                })
            }
        };

        let field = |k: AnnotationKey| {
            let value = self.extractor.extract(annotations, k);
            let value = value.trim();
            if value.is_empty() {
                k.default_value().to_string()
            } else {
                value.to_string()
            }
        };

        Ok(DesiredCheckSpec {
            name: key.to_string(),
            description: key.to_string(),
            target,
            port: field(AnnotationKey::Port),
            protocol: field(AnnotationKey::Protocol),
            path: field(AnnotationKey::Path),
            method: field(AnnotationKey::Method),
            http_code: field(AnnotationKey::SuccessCodes),
            timeout: field(AnnotationKey::Timeout),
            interval: field(AnnotationKey::Interval),
            enabled: true,
        })
    }
}

impl TryFrom<&DesiredCheckSpec> for CheckPayload {
    type Error = SyncError;

    fn try_from(spec: &DesiredCheckSpec) -> Result<Self, Self::Error> {
        Ok(CheckPayload {
            name: spec.name.clone(),
            description: spec.description.clone(),
            target: spec.target.clone(),
            port: parse_port(&spec.port)?,
            protocol: spec.protocol.clone(),
            path: spec.path.clone(),
            method: spec.method.clone(),
            http_code: spec.http_code.clone(),
            timeout: parse_duration_secs("timeout", &spec.timeout)?,
            interval: parse_duration_secs("interval", &spec.interval)?,
            enabled: spec.enabled,
        })
    }
}

fn parse_port(value: &str) -> SyncResult<u16> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(SyncError::ConversionFailed {
            field: "port",
            value: value.to_string(),
        }),
    }
}

/// Parse `"30"`, `"30s"`, `"2m"`, `"1m30s"` and the like into whole seconds.
///
/// A bare number counts as seconds; anything else goes through `humantime`.
fn parse_duration_secs(field: &'static str, value: &str) -> SyncResult<u64> {
    let invalid = || SyncError::ConversionFailed {
        field,
        value: value.to_string(),
    };

    if let Ok(secs) = value.parse::<u64>() {
        return Ok(secs);
    }

    let duration = humantime::parse_duration(value).map_err(|_| invalid())?;
    if duration.subsec_nanos() != 0 {
        return Err(invalid());
    }
    Ok(duration.as_secs())
}
