//! Alias resolver: rewrite generic package qualifiers to concrete import aliases.
//!
//! Works on the syntax tree. Only path qualifiers are touched; string
//! literals, field names and comments never are.

use std::collections::BTreeSet;

use codify_core::{is_generic_token, AliasTable};
use proc_macro2::Span;
use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::visit_mut::{self, VisitMut};
use syn::{Expr, Ident, Token};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("parse source: {0}")]
    Parse(#[from] syn::Error),
}

pub struct AliasResolver<'t> {
    table: &'t AliasTable,
}

impl<'t> AliasResolver<'t> {
    pub fn new(table: &'t AliasTable) -> Self {
        Self { table }
    }

    /// Resolve source text (an expression or a whole file) and pretty-print it.
    pub fn resolve(&self, source: &str, default_alias: &str) -> Result<String, ResolveError> {
        if let Ok(mut file) = syn::parse_str::<syn::File>(source) {
            let mut rw = Rewriter::new(self.table, default_alias);
            rw.visit_file_mut(&mut file);
            rw.finish()?;
            return Ok(prettyplease::unparse(&file));
        }
        let mut expr: Expr = syn::parse_str(source)?;
        self.resolve_expr(&mut expr, default_alias)?;
        Ok(unparse_expr(&expr))
    }

    /// Rewrite `expr` in place; returns the table aliases it now references.
    pub fn resolve_expr(&self, expr: &mut Expr, default_alias: &str) -> Result<BTreeSet<String>, ResolveError> {
        let mut rw = Rewriter::new(self.table, default_alias);
        rw.visit_expr_mut(expr);
        rw.finish()
    }

    /// Alias a type name is written with when its package's default alias is `default_alias`.
    pub fn alias_for_type<'a>(&'a self, type_name: &str, default_alias: &'a str) -> &'a str {
        self.table.override_for(type_name).unwrap_or(default_alias)
    }

    /// `use <package> as <alias>;` for every alias the table knows.
    pub fn imports(&self, aliases: &BTreeSet<String>) -> Vec<syn::ItemUse> {
        aliases
            .iter()
            .filter_map(|alias| {
                let pkg = self.table.package_for(alias)?;
                syn::parse_str::<syn::ItemUse>(&format!("use {pkg} as {alias};")).ok()
            })
            .collect()
    }
}

struct Rewriter<'a> {
    table: &'a AliasTable,
    default_alias: &'a str,
    used: BTreeSet<String>,
    error: Option<syn::Error>,
}

impl<'a> Rewriter<'a> {
    fn new(table: &'a AliasTable, default_alias: &'a str) -> Self {
        Self { table, default_alias, used: BTreeSet::new(), error: None }
    }

    fn finish(self) -> Result<BTreeSet<String>, ResolveError> {
        match self.error {
            Some(e) => Err(e.into()),
            None => Ok(self.used),
        }
    }

    fn rewrite(&mut self, path: &mut syn::Path) {
        if path.leading_colon.is_some() || path.segments.len() < 2 { return; }
        let span = path.segments[0].ident.span();
        // Generic phase.
        if is_generic_token(&path.segments[0].ident.to_string()) {
            path.segments[0].ident = Ident::new(self.default_alias, span);
        }
        // Override phase.
        if path.segments[0].ident == self.default_alias {
            let type_name = path.segments[1].ident.to_string();
            if let Some(alias) = self.table.override_for(&type_name) {
                path.segments[0].ident = Ident::new(alias, Span::call_site());
            }
        }
        let q = path.segments[0].ident.to_string();
        if self.table.package_for(&q).is_some() {
            self.used.insert(q);
        }
    }
}

impl VisitMut for Rewriter<'_> {
    fn visit_path_mut(&mut self, path: &mut syn::Path) {
        self.rewrite(path);
        visit_mut::visit_path_mut(self, path);
    }

    fn visit_macro_mut(&mut self, mac: &mut syn::Macro) {
        if mac.path.is_ident("vec") {
            match mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
                Ok(mut items) => {
                    for item in items.iter_mut() {
                        self.visit_expr_mut(item);
                    }
                    mac.tokens = items.into_token_stream();
                }
                Err(e) => {
                    self.error.get_or_insert(e);
                }
            }
        }
        visit_mut::visit_macro_mut(self, mac);
    }
}

/// Pretty-print a bare expression through a throwaway item.
pub(crate) fn unparse_expr(expr: &Expr) -> String {
    let file: syn::File = syn::parse_quote!(const _: () = #expr;);
    let text = prettyplease::unparse(&file);
    let body = text.strip_prefix("const _: () = ").unwrap_or(&text);
    body.trim_end().trim_end_matches(';').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codify_core::{OverrideList, Origin};

    fn k8s() -> AliasTable {
        AliasTable::kubernetes()
    }

    #[test]
    fn generic_tokens_take_default_then_overrides() {
        let table = k8s();
        let r = AliasResolver::new(&table);
        let src = "v1::Deployment { metadata: v1::ObjectMeta { ..Default::default() }, spec: Some(v1::DeploymentSpec { template: v1::PodTemplateSpec { ..Default::default() }, ..Default::default() }), ..Default::default() }";
        let out = r.resolve(src, "appsv1").unwrap();
        assert!(out.starts_with("appsv1::Deployment {"));
        assert!(out.contains("metav1::ObjectMeta {"));
        assert!(out.contains("appsv1::DeploymentSpec {"));
        assert!(out.contains("corev1::PodTemplateSpec {"));
    }

    #[test]
    fn strings_field_names_and_foreign_paths_are_untouched() {
        let table = k8s();
        let r = AliasResolver::new(&table);
        let src = r#"v1::Container { name: "v1::Container".to_string(), v1: Some(std::collections::BTreeMap::new()), ..Default::default() }"#;
        let out = r.resolve(src, "appsv1").unwrap();
        assert!(out.contains("corev1::Container {"));
        assert!(out.contains(r#""v1::Container".to_string()"#));
        assert!(out.contains("v1: Some(std::collections::BTreeMap::new())"));
    }

    #[test]
    fn vec_bodies_are_rewritten() {
        let table = k8s();
        let r = AliasResolver::new(&table);
        let mut expr: Expr = syn::parse_str("Some(vec![v1::Container { ..Default::default() }, v1::Container { ..Default::default() }])").unwrap();
        let used = r.resolve_expr(&mut expr, "appsv1").unwrap();
        let out = unparse_expr(&expr);
        assert_eq!(out.matches("corev1::Container").count(), 2);
        assert_eq!(used.into_iter().collect::<Vec<_>>(), ["corev1"]);
    }

    #[test]
    fn non_generic_qualifiers_keep_their_package() {
        let table = k8s();
        let r = AliasResolver::new(&table);
        let mut expr: Expr = syn::parse_str(
            r#"v1::HTTPGetAction { port: intstr::IntOrString::Int(8080), ..Default::default() }"#,
        )
        .unwrap();
        let used = r.resolve_expr(&mut expr, "appsv1").unwrap();
        assert_eq!(used.into_iter().collect::<Vec<_>>(), ["corev1", "intstr"]);
        let imports: Vec<String> = r
            .imports(&["corev1".to_string(), "intstr".to_string(), "nope".to_string()].into_iter().collect())
            .iter()
            .map(|u| u.to_token_stream().to_string())
            .collect();
        assert_eq!(imports.len(), 2);
        assert!(imports[0].contains("k8s_openapi :: api :: core :: v1 as corev1"));
    }

    #[test]
    fn resolve_is_stable() {
        let table = k8s();
        let r = AliasResolver::new(&table);
        let src = "v1beta1::PodSecurityPolicy {\nmetadata: v1::ObjectMeta {\nname: Some(\"restricted\".to_string(),\n),\n..Default::default()},\nspec: Some(v1beta1::PodSecurityPolicySpec {\nrun_as_user: v1beta1::RunAsUserStrategyOptions {\nranges: Some(vec![\nv1beta1::IDRange {\nmax: 2,\nmin: 1,\n..Default::default()},\n],\n),\n..Default::default()},\n..Default::default()},\n),\n..Default::default()}";
        let once = r.resolve(src, "policyv1beta1").unwrap();
        assert_eq!(r.resolve(&once, "policyv1beta1").unwrap(), once);
        assert!(once.contains("policyv1beta1::IDRange"));
        assert!(once.contains("metav1::ObjectMeta"));
    }

    #[test]
    fn last_override_list_wins() {
        // Meta and policy both claim `Shared`; policy is applied last.
        let table = AliasTable::new(
            [("x::apps::v1", "appsx"), ("x::meta::v1", "metax"), ("x::policy::v1beta1", "policyx")],
            vec![
                OverrideList::new(Origin::Meta, "metax", ["Shared", "OnlyMeta"]),
                OverrideList::new(Origin::Policy, "policyx", ["Shared"]),
            ],
        )
        .unwrap();
        let r = AliasResolver::new(&table);
        let out = r
            .resolve("v1::Holder { a: v1::Shared { ..Default::default() }, b: v1::OnlyMeta { ..Default::default() }, ..Default::default() }", "appsx")
            .unwrap();
        assert!(out.contains("policyx::Shared"));
        assert!(out.contains("metax::OnlyMeta"));
        assert!(out.contains("appsx::Holder"));
    }

    #[test]
    fn whole_files_resolve_too() {
        let table = k8s();
        let r = AliasResolver::new(&table);
        let out = r.resolve("fn f() -> v1::Deployment { v1::Deployment { ..Default::default() } }", "appsv1").unwrap();
        assert_eq!(out.matches("appsv1::Deployment").count(), 2);
    }
}
