//! The closed value model every literal is built from.

use std::collections::BTreeSet;

use serde_json::{Map as JsonMap, Value as Json};

/// One value in an object graph.
///
/// The set of kinds is closed: anything that is not a record, sequence,
/// key-ordered mapping, scalar or optional is `Opaque` and cannot be emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Record(Record),
    Seq(Vec<Node>),
    /// Entries in key order.
    Map(Vec<(Node, Node)>),
    Scalar(Scalar),
    Optional(Option<Box<Node>>),
    Opaque { type_name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// RFC 3339 text, reconstructed with `str::parse`.
    Timestamp(String),
}

/// Where a record type lives. `package` is the canonical module path when the
/// node came from a typed value, or just the qualifier when it was re-parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePath {
    pub package: String,
    pub name: String,
    pub variant: Option<String>,
}

impl TypePath {
    /// Short package token used to qualify the type in source (`v1`, `resource`).
    pub fn qualifier(&self) -> &str {
        self.package.rsplit("::").next().unwrap_or(&self.package)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Named(Vec<Field>),
    Tuple(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub path: TypePath,
    pub shape: Shape,
    /// Set for API resource types, which serialize `apiVersion` and `kind`
    /// without a field holding them.
    pub type_meta: Option<TypeMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMeta {
    pub api_version: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// Wire name when it is not the camelCase form of `name`.
    pub json_name: Option<String>,
    pub value: Node,
}

impl Field {
    pub fn new(name: &str, json_name: Option<&str>, value: Node) -> Self {
        Self { name: name.to_string(), json_name: json_name.map(str::to_string), value }
    }

    pub fn wire_name(&self) -> String {
        match &self.json_name {
            Some(j) => j.clone(),
            None => camel_case(&self.name),
        }
    }
}

/// `host_network` -> `hostNetwork`, `type_` -> `type`.
pub fn camel_case(snake: &str) -> String {
    let snake = snake.strip_prefix("r#").unwrap_or(snake).trim_end_matches('_');
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl Node {
    pub fn record(package: &str, name: &str, fields: Vec<Field>) -> Node {
        Node::Record(Record {
            path: TypePath { package: package.to_string(), name: name.to_string(), variant: None },
            shape: Shape::Named(fields),
            type_meta: None,
        })
    }

    pub fn tuple(package: &str, name: &str, inner: Node) -> Node {
        Node::Record(Record {
            path: TypePath { package: package.to_string(), name: name.to_string(), variant: None },
            shape: Shape::Tuple(vec![inner]),
            type_meta: None,
        })
    }

    pub fn variant(package: &str, name: &str, variant: &str, inner: Node) -> Node {
        Node::Record(Record {
            path: TypePath {
                package: package.to_string(),
                name: name.to_string(),
                variant: Some(variant.to_string()),
            },
            shape: Shape::Tuple(vec![inner]),
            type_meta: None,
        })
    }

    /// Mark a record as an API resource of the given group/version and kind.
    pub fn with_type_meta(self, api_version: &str, kind: &str) -> Node {
        match self {
            Node::Record(mut r) => {
                r.type_meta = Some(TypeMeta { api_version: api_version.to_string(), kind: kind.to_string() });
                Node::Record(r)
            }
            other => other,
        }
    }

    pub fn opaque(type_name: &str) -> Node {
        Node::Opaque { type_name: type_name.to_string() }
    }

    pub fn str(s: &str) -> Node {
        Node::Scalar(Scalar::Str(s.to_string()))
    }

    /// Canonical package of every record in the graph.
    pub fn packages(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_packages(&mut out);
        out
    }

    fn collect_packages(&self, out: &mut BTreeSet<String>) {
        match self {
            Node::Record(r) => {
                out.insert(r.path.package.clone());
                match &r.shape {
                    Shape::Named(fields) => fields.iter().for_each(|f| f.value.collect_packages(out)),
                    Shape::Tuple(items) => items.iter().for_each(|n| n.collect_packages(out)),
                }
            }
            Node::Seq(items) => items.iter().for_each(|n| n.collect_packages(out)),
            Node::Map(entries) => entries.iter().for_each(|(k, v)| {
                k.collect_packages(out);
                v.collect_packages(out);
            }),
            Node::Optional(Some(inner)) => inner.collect_packages(out),
            Node::Optional(None) | Node::Scalar(_) | Node::Opaque { .. } => {}
        }
    }

    /// Lower to the JSON the value would serialize to on the wire.
    pub fn to_json(&self) -> Json {
        match self {
            Node::Record(r) => match &r.shape {
                Shape::Named(fields) => {
                    let mut m = JsonMap::new();
                    if let Some(tm) = &r.type_meta {
                        m.insert("apiVersion".into(), Json::String(tm.api_version.clone()));
                        m.insert("kind".into(), Json::String(tm.kind.clone()));
                    }
                    for f in fields {
                        if matches!(f.value, Node::Optional(None)) { continue; }
                        m.insert(f.wire_name(), f.value.to_json());
                    }
                    Json::Object(m)
                }
                // Newtypes and single-payload variants serialize transparently.
                Shape::Tuple(items) if items.len() == 1 => items[0].to_json(),
                Shape::Tuple(items) => Json::Array(items.iter().map(Node::to_json).collect()),
            },
            Node::Seq(items) => Json::Array(items.iter().map(Node::to_json).collect()),
            Node::Map(entries) => {
                let mut m = JsonMap::new();
                for (k, v) in entries {
                    let key = match k.to_json() {
                        Json::String(s) => s,
                        other => other.to_string(),
                    };
                    m.insert(key, v.to_json());
                }
                Json::Object(m)
            }
            Node::Scalar(s) => match s {
                Scalar::Str(v) | Scalar::Timestamp(v) => Json::String(v.clone()),
                Scalar::Int(i) => Json::from(*i),
                Scalar::Float(f) => Json::from(*f),
                Scalar::Bool(b) => Json::Bool(*b),
            },
            Node::Optional(Some(inner)) => inner.to_json(),
            Node::Optional(None) | Node::Opaque { .. } => Json::Null,
        }
    }
}
