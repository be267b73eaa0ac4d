//! Wire types of the monitoring API.

use serde::{Deserialize, Deserializer, Serialize};

/// Body of create and update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckPayload {
    pub name: String,
    pub description: String,
    pub target: String,
    pub port: u16,
    pub protocol: String,
    pub path: String,
    pub method: String,
    #[serde(rename = "httpCode")]
    pub http_code: String,
    /// Seconds.
    pub timeout: u64,
    /// Seconds.
    pub interval: u64,
    pub enabled: bool,
}

/// A check as stored by the remote service.
///
/// Every field is optional on the wire; missing and `null` values decode as
/// the type's default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteCheckRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub port: u16,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protocol: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeout: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interval: u64,
    #[serde(rename = "valid-status", default, deserialize_with = "null_as_default")]
    pub valid_status: u16,
}

impl RemoteCheckRecord {
    /// Record the remote would hold after accepting `payload` under `id`.
    pub fn from_payload(id: impl Into<String>, payload: &CheckPayload) -> Self {
        Self {
            id: id.into(),
            name: payload.name.clone(),
            description: payload.description.clone(),
            target: payload.target.clone(),
            port: payload.port,
            protocol: payload.protocol.clone(),
            path: payload.path.clone(),
            method: payload.method.clone(),
            timeout: payload.timeout,
            interval: payload.interval,
            valid_status: first_status_code(&payload.http_code),
        }
    }
}

/// Response of the list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: usize,
    #[serde(rename = "http-checks", default, deserialize_with = "null_as_default")]
    pub http_checks: Vec<RemoteCheckRecord>,
}

/// Minimal shape of a create response; only the id is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CreatedCheck {
    #[serde(default)]
    pub id: Option<String>,
}

/// First code of a success-codes value such as `"200,204"`; 0 if none parses.
fn first_status_code(codes: &str) -> u16 {
    codes
        .split(',')
        .next()
        .and_then(|code| code.trim().parse().ok())
        .unwrap_or_default()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
