//! Resource identity and the sync key derived from it.

use std::collections::BTreeMap;
use std::fmt;

/// Stable key of a routing resource across its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentity {
    pub namespace: String,
    pub name: String,
}

impl ResourceIdentity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Canonical lookup key, `<namespace>_<name>`.
    pub fn sync_key(&self) -> SyncKey {
        SyncKey(format!("{}_{}", self.namespace, self.name))
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Name under which the remote check for a resource is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyncKey(String);

impl SyncKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SyncKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A routing resource as observed by the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingResource {
    pub identity: ResourceIdentity,
    pub annotations: BTreeMap<String, String>,
    /// Host of the first routing rule, if the resource declares one.
    pub first_rule_host: Option<String>,
}

/// Input of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource exists; its desired check can be built.
    Present(RoutingResource),
    /// Resource is gone; only its identity is known.
    Absent(ResourceIdentity),
}

impl ResourceState {
    pub fn identity(&self) -> &ResourceIdentity {
        match self {
            ResourceState::Present(resource) => &resource.identity,
            ResourceState::Absent(identity) => identity,
        }
    }

    pub fn sync_key(&self) -> SyncKey {
        self.identity().sync_key()
    }
}
