//! Ingress translation.
//!
//! Turns `networking.k8s.io/v1` Ingresses into reconcile inputs. Ingresses
//! being deleted (and finalizer cleanups) carry only their identity.

use k8s_openapi::api::networking::v1::Ingress;
use kube::runtime::finalizer::Event;
use kube::ResourceExt;

use crate::sync::{ResourceIdentity, ResourceState, RoutingResource};

/// Map a finalizer event to a reconcile input.
///
/// `Cleanup` is delivered while the finalizer still holds the Ingress, so a
/// deletion is never lost across watch restarts.
pub fn finalizer_state(event: Event<Ingress>) -> Option<ResourceState> {
    match event {
        Event::Apply(ingress) => observed_state(&ingress),
        Event::Cleanup(ingress) => identity_of(&ingress).map(ResourceState::Absent),
    }
}

/// State of a live ingress; one with a deletion timestamp counts as absent.
pub fn observed_state(ingress: &Ingress) -> Option<ResourceState> {
    let identity = identity_of(ingress)?;
    if ingress.metadata.deletion_timestamp.is_some() {
        return Some(ResourceState::Absent(identity));
    }

    let first_rule_host = ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.rules.as_ref())
        .and_then(|rules| rules.first())
        .and_then(|rule| rule.host.clone());

    Some(ResourceState::Present(RoutingResource {
        identity,
        annotations: ingress.annotations().clone(),
        first_rule_host,
    }))
}

pub fn identity_of(ingress: &Ingress) -> Option<ResourceIdentity> {
    let name = ingress.metadata.name.clone()?;
    let namespace = ingress.namespace().unwrap_or_else(|| "default".to_string());
    Some(ResourceIdentity::new(namespace, name))
}
