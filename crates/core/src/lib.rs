//! Codify core types: resource objects, kinds, the sanitizer and the alias table.

#![forbid(unsafe_code)]

pub mod alias;
pub mod kind;
pub mod sanitize;

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::policy::v1beta1::PodSecurityPolicy;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Serialize;

pub use alias::{is_generic_token, AliasTable, AliasTableError, OverrideList, Origin};
pub use kind::{Kind, KindSpec};
pub use sanitize::{sanitize, sanitize_object_name};

/// A deployable cluster resource, one variant per supported kind.
///
/// Serializes exactly like the wrapped object (including `apiVersion` and `kind`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceObject {
    Deployment(Deployment),
    StatefulSet(StatefulSet),
    PodSecurityPolicy(PodSecurityPolicy),
}

impl ResourceObject {
    pub fn kind(&self) -> Kind {
        match self {
            ResourceObject::Deployment(_) => Kind::Deployment,
            ResourceObject::StatefulSet(_) => Kind::StatefulSet,
            ResourceObject::PodSecurityPolicy(_) => Kind::PodSecurityPolicy,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            ResourceObject::Deployment(o) => &o.metadata,
            ResourceObject::StatefulSet(o) => &o.metadata,
            ResourceObject::PodSecurityPolicy(o) => &o.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            ResourceObject::Deployment(o) => &mut o.metadata,
            ResourceObject::StatefulSet(o) => &mut o.metadata,
            ResourceObject::PodSecurityPolicy(o) => &mut o.metadata,
        }
    }

    /// Object name, empty when the manifest relied on `generateName`.
    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or("")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata().namespace.as_deref()
    }

    /// `namespace/name` for namespaced objects, `name` otherwise.
    pub fn key(&self) -> String {
        match self.namespace() {
            Some(ns) => format!("{}/{}", ns, self.name()),
            None => self.name().to_string(),
        }
    }
}

impl From<Deployment> for ResourceObject {
    fn from(o: Deployment) -> Self { ResourceObject::Deployment(o) }
}

impl From<StatefulSet> for ResourceObject {
    fn from(o: StatefulSet) -> Self { ResourceObject::StatefulSet(o) }
}

impl From<PodSecurityPolicy> for ResourceObject {
    fn from(o: PodSecurityPolicy) -> Self { ResourceObject::PodSecurityPolicy(o) }
}
