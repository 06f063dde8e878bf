//! Lifecycle template compiler: per-object install/uninstall fragments.

use std::collections::BTreeSet;

use codify_core::{sanitize, sanitize_object_name, KindSpec, ResourceObject};
use codify_literal::{emit_checked, Codified, EmissionError};
use metrics::counter;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use tracing::debug;

use crate::resolve::AliasResolver;
use crate::CodegenError;

/// A sanitized object plus everything needed to generate code for it.
#[derive(Debug, Clone)]
pub struct KindAdapter {
    object: ResourceObject,
    ident: String,
}

/// One generated method of the application type.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub name: Ident,
    pub item: syn::ImplItemFn,
    /// Import aliases the fragment's code refers to.
    pub aliases: BTreeSet<String>,
}

/// Hands out batch-unique fragment names.
#[derive(Debug, Default)]
pub struct FragmentNamer {
    issued: u32,
}

impl FragmentNamer {
    pub fn new() -> Self { Self::default() }

    /// `(install_NNN_<slug>, uninstall_NNN_<slug>)` for the next object.
    pub fn next_pair(&mut self, slug: &str) -> (Ident, Ident) {
        self.issued += 1;
        let n = self.issued;
        (
            Ident::new(&format!("install_{n:03}_{slug}"), Span::call_site()),
            Ident::new(&format!("uninstall_{n:03}_{slug}"), Span::call_site()),
        )
    }

    pub fn issued(&self) -> u32 { self.issued }
}

impl KindAdapter {
    pub fn new(obj: &ResourceObject) -> Self {
        Self { object: sanitize(obj), ident: generated_identifier(obj.name()) }
    }

    pub fn object(&self) -> &ResourceObject { &self.object }

    /// Identifier-safe form of the object's name.
    pub fn ident(&self) -> &str { &self.ident }

    pub fn kind_spec(&self) -> &'static KindSpec { self.object.kind().spec() }

    /// Name of the local binding holding the literal.
    pub fn binding(&self) -> String {
        format!("{}_{}", self.ident, snake_case(self.kind_spec().name))
    }

    pub fn codify(&self) -> Result<Codified<'_, ResourceObject>, EmissionError> {
        emit_checked(&self.object)
    }

    /// Alias-qualified type of the object, e.g. `appsv1::Deployment`.
    fn object_type(&self, resolver: &AliasResolver<'_>, aliases: &mut BTreeSet<String>) -> TokenStream {
        let spec = self.kind_spec();
        let alias = resolver.alias_for_type(spec.name, spec.default_alias);
        aliases.insert(alias.to_string());
        let alias = Ident::new(alias, Span::call_site());
        let name = Ident::new(spec.name, Span::call_site());
        quote!(#alias::#name)
    }

    fn api(&self, ty: &TokenStream) -> TokenStream {
        if !self.kind_spec().namespaced {
            return quote!(kube::Api::<#ty>::all(client.clone()));
        }
        match self.object.namespace() {
            Some(ns) => quote!(kube::Api::<#ty>::namespaced(client.clone(), #ns)),
            None => quote!(kube::Api::<#ty>::default_namespaced(client.clone())),
        }
    }

    /// Bind the literal, record it, and create it when a client is present.
    pub fn install(&self, name: Ident, resolver: &AliasResolver<'_>) -> Result<Fragment, CodegenError> {
        let spec = self.kind_spec();
        let codified = self.codify().map_err(|source| CodegenError::Emit {
            kind: spec.kind,
            key: self.object.key(),
            source,
        })?;
        let mut literal: syn::Expr = syn::parse_str(&codified.source)?;
        let mut aliases = resolver.resolve_expr(&mut literal, spec.default_alias)?;
        let ty = self.object_type(resolver, &mut aliases);
        let api = self.api(&ty);
        let binding = Ident::new(&self.binding(), Span::call_site());
        let item: syn::ImplItemFn = syn::parse2(quote! {
            async fn #name(&mut self, client: Option<&kube::Client>) -> anyhow::Result<()> {
                let #binding: #ty = #literal;
                self.registry.push(#binding.clone());
                if let Some(client) = client {
                    let api = #api;
                    api.create(&kube::api::PostParams::default(), &#binding).await?;
                }
                Ok(())
            }
        })?;
        counter!("codify_fragments_total", 1u64);
        debug!(fragment = %name, kind = %spec.kind, object = %self.object.key(), "install fragment");
        Ok(Fragment { name, item, aliases })
    }

    /// Delete by (character-sanitized) name when a client is present.
    pub fn uninstall(&self, name: Ident, resolver: &AliasResolver<'_>) -> Result<Fragment, CodegenError> {
        let mut aliases = BTreeSet::new();
        let ty = self.object_type(resolver, &mut aliases);
        let api = self.api(&ty);
        let object_name = sanitize_object_name(self.object.name());
        let item: syn::ImplItemFn = syn::parse2(quote! {
            async fn #name(&self, client: Option<&kube::Client>) -> anyhow::Result<()> {
                if let Some(client) = client {
                    let api = #api;
                    api.delete(#object_name, &kube::api::DeleteParams::default()).await?;
                }
                Ok(())
            }
        })?;
        counter!("codify_fragments_total", 1u64);
        debug!(fragment = %name, object = %object_name, "uninstall fragment");
        Ok(Fragment { name, item, aliases })
    }
}

/// Lowercase words of `name` joined by `_`; never empty, never starts with a digit.
pub fn generated_identifier(name: &str) -> String {
    let words: Vec<String> = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect();
    let mut ident = words.join("_");
    if ident.is_empty() {
        ident.push_str("object");
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, 'r');
    }
    ident
}

/// `StatefulSet` -> `stateful_set`.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 { out.push('_'); }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use codify_core::AliasTable;
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::api::policy::v1beta1::PodSecurityPolicy;
    use quote::ToTokens;

    fn named(name: &str, ns: Option<&str>) -> ResourceObject {
        let mut d = Deployment::default();
        d.metadata.name = Some(name.into());
        d.metadata.namespace = ns.map(Into::into);
        d.into()
    }

    fn text(f: &Fragment) -> String {
        f.item.to_token_stream().to_string()
    }

    #[test]
    fn identifiers_are_rust_safe() {
        assert_eq!(generated_identifier("web"), "web");
        assert_eq!(generated_identifier("my app!"), "my_app");
        assert_eq!(generated_identifier("Front-End.v2"), "front_end_v2");
        assert_eq!(generated_identifier("3tier"), "r3tier");
        assert_eq!(generated_identifier("!!"), "object");
        assert_eq!(snake_case("PodSecurityPolicy"), "pod_security_policy");
    }

    #[test]
    fn namer_is_monotonic() {
        let mut n = FragmentNamer::new();
        let (a, b) = n.next_pair("web_deployment");
        let (c, _) = n.next_pair("web_deployment");
        assert_eq!(a.to_string(), "install_001_web_deployment");
        assert_eq!(b.to_string(), "uninstall_001_web_deployment");
        assert_eq!(c.to_string(), "install_002_web_deployment");
        assert_eq!(n.issued(), 2);
    }

    #[test]
    fn collection_follows_scope_and_namespace() {
        let table = AliasTable::kubernetes();
        let r = AliasResolver::new(&table);
        let mut n = FragmentNamer::new();

        let a = KindAdapter::new(&named("web", Some("prod")));
        let (i, _) = n.next_pair(&a.binding());
        let s = text(&a.install(i, &r).unwrap());
        assert!(s.contains("namespaced (client . clone () , \"prod\")"), "{s}");
        assert!(s.contains("let web_deployment : appsv1 :: Deployment"));

        let b = KindAdapter::new(&named("web", None));
        let (_, u) = n.next_pair(&b.binding());
        assert!(text(&b.uninstall(u, &r).unwrap()).contains("default_namespaced (client . clone ())"));

        let mut psp = PodSecurityPolicy::default();
        psp.metadata.name = Some("restricted".into());
        let c = KindAdapter::new(&psp.into());
        let (i, u) = n.next_pair(&c.binding());
        let install = c.install(i, &r).unwrap();
        assert!(text(&install).contains("kube :: Api :: < policyv1beta1 :: PodSecurityPolicy > :: all"));
        assert!(install.aliases.contains("metav1"));
        assert!(text(&c.uninstall(u, &r).unwrap()).contains("delete (\"restricted\""));
    }
}
