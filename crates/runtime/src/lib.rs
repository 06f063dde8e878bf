//! Codify runtime: what generated programs link against.
//!
//! A generated program defines one `App` type implementing [`Deployable`];
//! its install fragments append every object to a [`Registry`], which the
//! [`render`] functions turn into text. [`run_command_line`] is the whole
//! `main` of a generated program.

#![forbid(unsafe_code)]

mod cli;
mod render;

use codify_core::ResourceObject;

pub use async_trait::async_trait;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

pub use cli::{run_command_line, run_with_args};
pub use render::{render, Encoding, RenderError};

/// An application whose objects can be installed into, or removed from, a cluster.
///
/// `None` for the client means dry-run: fragments still populate the
/// registry but issue no API calls.
#[async_trait]
pub trait Deployable: Send + Sync {
    async fn install(&mut self, client: Option<&kube::Client>) -> anyhow::Result<()>;
    async fn uninstall(&self, client: Option<&kube::Client>) -> anyhow::Result<()>;
    fn meta(&self) -> &ObjectMeta;
    fn registry(&self) -> &Registry;

    fn objects(&self) -> &[ResourceObject] {
        self.registry().as_slice()
    }
}

/// Objects recorded by install fragments, in execution order.
///
/// Append-only. Pushing the same object twice records it twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    objects: Vec<ResourceObject>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, obj: impl Into<ResourceObject>) {
        let obj = obj.into();
        tracing::debug!(kind = %obj.kind(), object = %obj.key(), "registered");
        self.objects.push(obj);
    }

    pub fn len(&self) -> usize { self.objects.len() }
    pub fn is_empty(&self) -> bool { self.objects.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceObject> { self.objects.iter() }
    pub fn as_slice(&self) -> &[ResourceObject] { &self.objects }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a ResourceObject;
    type IntoIter = std::slice::Iter<'a, ResourceObject>;
    fn into_iter(self) -> Self::IntoIter { self.objects.iter() }
}
