//! Read emitted source back into a `Node` tree.

use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, Lit, Member, Token, UnOp};

use crate::emit::EmissionError;
use crate::node::{Field, Node, Record, Scalar, Shape, TypePath};

/// Parse literal source produced by [`emit`](crate::emit).
///
/// Record packages come back as their qualifier only. Wire-name overrides and
/// resource type metadata are not recoverable; neither affects the printed form.
pub fn parse_source(text: &str) -> Result<Node, EmissionError> {
    let expr: Expr = syn::parse_str(text)?;
    Ok(to_node(&expr)?)
}

fn unsupported(e: &impl Spanned, what: &str) -> syn::Error {
    syn::Error::new(e.span(), format!("unsupported literal form: {what}"))
}

fn to_node(expr: &Expr) -> syn::Result<Node> {
    match expr {
        Expr::Struct(s) => {
            let path = type_path(&s.path)?;
            if path.variant.is_some() { return Err(unsupported(&s.path, "struct variant")); }
            let mut fields = Vec::with_capacity(s.fields.len());
            for fv in &s.fields {
                let Member::Named(ident) = &fv.member else { return Err(unsupported(&fv.member, "unnamed member")) };
                fields.push(Field { name: ident.to_string(), json_name: None, value: to_node(&fv.expr)? });
            }
            Ok(Node::Record(Record { path, shape: Shape::Named(fields), type_meta: None }))
        }
        Expr::Call(c) => {
            let Expr::Path(func) = &*c.func else { return Err(unsupported(&c.func, "callee")) };
            let segs: Vec<String> = func.path.segments.iter().map(|s| s.ident.to_string()).collect();
            if segs == ["Some"] {
                let [inner] = one_arg(c)?;
                return Ok(Node::Optional(Some(Box::new(to_node(inner)?))));
            }
            if segs.join("::") == "std::collections::BTreeMap::from" {
                let [arg] = one_arg(c)?;
                return map_entries(arg);
            }
            if segs.join("::") == "std::collections::BTreeMap::new" && c.args.is_empty() {
                return Ok(Node::Map(Vec::new()));
            }
            let path = type_path(&func.path)?;
            let items = c.args.iter().map(to_node).collect::<syn::Result<Vec<_>>>()?;
            Ok(Node::Record(Record { path, shape: Shape::Tuple(items), type_meta: None }))
        }
        Expr::Path(p) if p.path.is_ident("None") => Ok(Node::Optional(None)),
        Expr::Macro(m) if m.mac.path.is_ident("vec") => {
            let items = m.mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated)?;
            Ok(Node::Seq(items.iter().map(to_node).collect::<syn::Result<_>>()?))
        }
        Expr::MethodCall(mc) if mc.args.is_empty() => match (mc.method.to_string().as_str(), &*mc.receiver) {
            ("to_string", Expr::Lit(l)) => match &l.lit {
                Lit::Str(s) => Ok(Node::Scalar(Scalar::Str(s.value()))),
                other => Err(unsupported(other, "to_string receiver")),
            },
            ("unwrap_or_default", Expr::MethodCall(inner)) if inner.method == "parse" && inner.args.is_empty() => {
                match &*inner.receiver {
                    Expr::Lit(l) => match &l.lit {
                        Lit::Str(s) => Ok(Node::Scalar(Scalar::Timestamp(s.value()))),
                        other => Err(unsupported(other, "timestamp")),
                    },
                    other => Err(unsupported(other, "timestamp")),
                }
            }
            _ => Err(unsupported(mc, "method call")),
        },
        Expr::Lit(l) => scalar(&l.lit, false),
        Expr::Unary(u) if matches!(u.op, UnOp::Neg(_)) => match &*u.expr {
            Expr::Lit(l) => scalar(&l.lit, true),
            other => Err(unsupported(other, "negation")),
        },
        other => Err(unsupported(other, "expression")),
    }
}

fn one_arg(c: &syn::ExprCall) -> syn::Result<[&Expr; 1]> {
    let mut it = c.args.iter();
    match (it.next(), it.next()) {
        (Some(a), None) => Ok([a]),
        _ => Err(unsupported(c, "argument count")),
    }
}

fn map_entries(arg: &Expr) -> syn::Result<Node> {
    let Expr::Array(arr) = arg else { return Err(unsupported(arg, "map entries")) };
    let mut entries = Vec::with_capacity(arr.elems.len());
    for e in &arr.elems {
        let Expr::Tuple(t) = e else { return Err(unsupported(e, "map entry")) };
        let mut it = t.elems.iter();
        let (Some(k), Some(v), None) = (it.next(), it.next(), it.next()) else {
            return Err(unsupported(t, "map entry arity"));
        };
        entries.push((to_node(k)?, to_node(v)?));
    }
    Ok(Node::Map(entries))
}

fn scalar(lit: &Lit, negative: bool) -> syn::Result<Node> {
    let sign = if negative { -1 } else { 1 };
    match lit {
        Lit::Int(i) => Ok(Node::Scalar(Scalar::Int(sign * i.base10_parse::<i64>()?))),
        Lit::Float(f) => Ok(Node::Scalar(Scalar::Float(sign as f64 * f.base10_parse::<f64>()?))),
        Lit::Bool(b) if !negative => Ok(Node::Scalar(Scalar::Bool(b.value))),
        other => Err(unsupported(other, "literal")),
    }
}

fn type_path(path: &syn::Path) -> syn::Result<TypePath> {
    let segs: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    match segs.as_slice() {
        [q, name] => Ok(TypePath { package: q.clone(), name: name.clone(), variant: None }),
        [q, name, variant] => Ok(TypePath { package: q.clone(), name: name.clone(), variant: Some(variant.clone()) }),
        _ => Err(unsupported(path, "type path")),
    }
}
