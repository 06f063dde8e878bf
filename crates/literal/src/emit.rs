//! Printer, delimiter fix-up and the emission entry points.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use metrics::{counter, histogram};
use serde::Serialize;
use serde_json::Value as Json;
use thiserror::Error;
use tracing::debug;

use crate::node::{Node, Record, Scalar, Shape};
use crate::Literal;

const MAP_PATH: &str = "std::collections::BTreeMap";

#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("no literal form for {type_name} at {path}")]
    Unsupported { path: String, type_name: String },
    #[error("literal does not reproduce the object at {path}")]
    Unfaithful { path: String },
    #[error("serialize object: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("parse literal: {0}")]
    Parse(#[from] syn::Error),
}

/// Source literal of one object plus the packages it references.
#[derive(Debug, Clone)]
pub struct Codified<'a, T: ?Sized> {
    pub source: String,
    /// Canonical module paths of every record type in `source`.
    pub packages: BTreeSet<String>,
    pub node: Node,
    pub object: &'a T,
}

/// Emit `obj` as a source literal.
///
/// Fails without partial output when any value in the graph has no literal form.
pub fn emit<T: Literal + ?Sized>(obj: &T) -> Result<Codified<'_, T>, EmissionError> {
    let t0 = std::time::Instant::now();
    counter!("codify_emit_total", 1u64);
    let node = obj.to_node();
    let source = match render(&node) {
        Ok(s) => s,
        Err(e) => {
            counter!("codify_emit_err", 1u64);
            return Err(e);
        }
    };
    let packages = node.packages();
    histogram!("codify_emit_ms", t0.elapsed().as_secs_f64() * 1000.0);
    debug!(bytes = source.len(), packages = packages.len(), "literal emitted");
    Ok(Codified { source, packages, node, object: obj })
}

/// `emit`, then verify the literal carries every field the object serializes.
///
/// Resource records at any depth contribute the `apiVersion` and `kind` their
/// type implies, so nested resources (claim templates) compare like the root.
pub fn emit_checked<T: Literal + Serialize + ?Sized>(obj: &T) -> Result<Codified<'_, T>, EmissionError> {
    let codified = emit(obj)?;
    let expected = serde_json::to_value(obj)?;
    if let Some(path) = first_difference(&expected, &codified.node.to_json(), String::new()) {
        counter!("codify_emit_err", 1u64);
        return Err(EmissionError::Unfaithful { path: if path.is_empty() { "<root>".into() } else { path } });
    }
    Ok(codified)
}

/// Print a node tree and apply the delimiter fix-up.
pub fn render(node: &Node) -> Result<String, EmissionError> {
    let mut out = String::new();
    let mut path = Vec::new();
    write_node(node, &mut path, &mut out)?;
    Ok(fix_adjacent_closers(&out))
}

fn write_node(node: &Node, path: &mut Vec<String>, out: &mut String) -> Result<(), EmissionError> {
    match node {
        Node::Record(r) => write_record(r, path, out)?,
        Node::Seq(items) => {
            if items.is_empty() {
                out.push_str("vec![]");
                return Ok(());
            }
            out.push_str("vec![\n");
            for (i, item) in items.iter().enumerate() {
                if i > 0 { out.push_str(",\n"); }
                path.push(format!("[{i}]"));
                write_node(item, path, out)?;
                path.pop();
            }
            out.push(']');
        }
        Node::Map(entries) => {
            if entries.is_empty() {
                let _ = write!(out, "{MAP_PATH}::new()");
                return Ok(());
            }
            let _ = write!(out, "{MAP_PATH}::from([\n");
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 { out.push_str(",\n"); }
                path.push(format!("[{}]", k.to_json()));
                out.push('(');
                write_node(k, path, out)?;
                out.push_str(", ");
                write_node(v, path, out)?;
                out.push(')');
                path.pop();
            }
            out.push_str("])");
        }
        Node::Scalar(s) => write_scalar(s, out),
        Node::Optional(Some(inner)) => {
            out.push_str("Some(");
            write_node(inner, path, out)?;
            out.push(')');
        }
        Node::Optional(None) => out.push_str("None"),
        Node::Opaque { type_name } => {
            return Err(EmissionError::Unsupported { path: join_path(path), type_name: type_name.clone() });
        }
    }
    Ok(())
}

fn write_record(r: &Record, path: &mut Vec<String>, out: &mut String) -> Result<(), EmissionError> {
    let _ = write!(out, "{}::{}", r.path.qualifier(), r.path.name);
    if let Some(v) = &r.path.variant {
        let _ = write!(out, "::{v}");
    }
    match &r.shape {
        Shape::Named(fields) => {
            out.push_str(" {\n");
            for f in fields {
                // Unset optionals come from `..Default::default()`.
                if matches!(f.value, Node::Optional(None)) { continue; }
                let _ = write!(out, "{}: ", f.name);
                path.push(f.name.clone());
                write_node(&f.value, path, out)?;
                path.pop();
                out.push_str(",\n");
            }
            out.push_str("..Default::default()}");
        }
        Shape::Tuple(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 { out.push_str(", "); }
                path.push(i.to_string());
                write_node(item, path, out)?;
                path.pop();
            }
            out.push(')');
        }
    }
    Ok(())
}

fn write_scalar(s: &Scalar, out: &mut String) {
    let _ = match s {
        Scalar::Str(v) => write!(out, "{v:?}.to_string()"),
        Scalar::Int(i) => write!(out, "{i}"),
        Scalar::Float(f) => write!(out, "{f:?}"),
        Scalar::Bool(b) => write!(out, "{b}"),
        Scalar::Timestamp(ts) => write!(out, "{ts:?}.parse().unwrap_or_default()"),
    };
}

fn join_path(path: &[String]) -> String {
    let mut out = String::new();
    for seg in path {
        if !out.is_empty() && !seg.starts_with('[') { out.push('.'); }
        out.push_str(seg);
    }
    if out.is_empty() { "<root>".into() } else { out }
}

/// Separate directly adjacent closing delimiters.
///
/// Outside string literals, a `)`, `]` or `}` immediately followed by `)` or
/// `]`, or a `}` immediately followed by `}`, gets `,` and a newline inserted
/// between them. Running it on its own output changes nothing.
pub fn fix_adjacent_closers(src: &str) -> String {
    let mut out = String::with_capacity(src.len() + src.len() / 8);
    let mut in_str = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;
    for c in src.chars() {
        if in_str {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_str = false;
                prev = Some(c);
            }
            continue;
        }
        if let Some(p) = prev {
            if needs_separator(p, c) { out.push_str(",\n"); }
        }
        if c == '"' { in_str = true; }
        out.push(c);
        prev = Some(c);
    }
    out
}

fn needs_separator(prev: char, next: char) -> bool {
    matches!((prev, next), (')' | ']' | '}', ')' | ']') | ('}', '}'))
}

fn first_difference(expected: &Json, actual: &Json, path: String) -> Option<String> {
    let child = |key: &str| if path.is_empty() { key.to_string() } else { format!("{path}.{key}") };
    match (expected, actual) {
        (Json::Object(a), Json::Object(b)) => {
            for (k, va) in a {
                match b.get(k) {
                    Some(vb) => {
                        if let Some(p) = first_difference(va, vb, child(k)) { return Some(p); }
                    }
                    None => return Some(child(k)),
                }
            }
            b.keys().find(|k| !a.contains_key(*k)).map(|k| child(k))
        }
        (Json::Array(a), Json::Array(b)) => {
            if a.len() != b.len() { return Some(path); }
            a.iter()
                .zip(b)
                .enumerate()
                .find_map(|(i, (va, vb))| first_difference(va, vb, format!("{path}[{i}]")))
        }
        _ if expected == actual => None,
        _ => Some(path),
    }
}
