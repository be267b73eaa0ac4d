//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use healthcheck_sync::config::RemoteConfig;
use healthcheck_sync::sync::{ResourceIdentity, ResourceState, RoutingResource};
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";

/// Present ingress `namespace/name` with one rule for `host`.
pub fn present(namespace: &str, name: &str, host: &str) -> ResourceState {
    present_with(namespace, name, Some(host), &[])
}

/// Present ingress with explicit annotations given as `(suffix, value)`.
pub fn present_with(
    namespace: &str,
    name: &str,
    host: Option<&str>,
    annotations: &[(&str, &str)],
) -> ResourceState {
    let annotations: BTreeMap<String, String> = annotations
        .iter()
        .map(|(suffix, value)| (format!("wenti.dev/{}", suffix), value.to_string()))
        .collect();

    ResourceState::Present(RoutingResource {
        identity: ResourceIdentity::new(namespace, name),
        annotations,
        first_rule_host: host.map(str::to_string),
    })
}

pub fn absent(namespace: &str, name: &str) -> ResourceState {
    ResourceState::Absent(ResourceIdentity::new(namespace, name))
}

/// Remote settings pointing at a mock server.
pub fn remote_config(base_url: &str) -> RemoteConfig {
    RemoteConfig {
        base_url: base_url.to_string(),
        token: TOKEN.to_string(),
        request_timeout_secs: 5,
        ..RemoteConfig::default()
    }
}

/// List endpoint body holding the given `(id, name, target)` checks.
pub fn check_list(checks: &[(&str, &str, &str)]) -> Value {
    let items: Vec<Value> = checks
        .iter()
        .map(|(id, name, target)| {
            json!({
                "id": id,
                "name": name,
                "description": name,
                "target": target,
                "port": 8080,
                "protocol": "http",
                "path": "/",
                "method": "GET",
                "timeout": 30,
                "interval": 60,
                "valid-status": 200,
                "contentType": null,
                "headers": null,
                "query": null,
                "body": null,
                "labels": null
            })
        })
        .collect();
    json!({ "count": items.len(), "http-checks": items })
}
