//! Codify manifest loading: YAML/JSON documents to typed resource objects.

#![forbid(unsafe_code)]

use codify_core::{Kind, ResourceObject};
use metrics::counter;
use serde::Deserialize;
use serde_json::Value as Json;
use thiserror::Error;
use tracing::{debug, warn};

fn max_yaml_bytes() -> usize {
    std::env::var("CODIFY_MAX_YAML_BYTES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1_000_000) // 1 MiB default
}

fn max_yaml_nodes() -> usize {
    std::env::var("CODIFY_MAX_YAML_NODES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(100_000)
}

fn json_node_budget_exceeded(v: &Json, max: usize) -> bool {
    // Running counter; bail as soon as the budget is reached.
    fn walk(v: &Json, cur: &mut usize, max: usize) {
        if *cur >= max { return; }
        *cur += 1;
        match v {
            Json::Object(map) => {
                for vv in map.values() {
                    if *cur >= max { break; }
                    walk(vv, cur, max);
                }
            }
            Json::Array(arr) => {
                for vv in arr.iter() {
                    if *cur >= max { break; }
                    walk(vv, cur, max);
                }
            }
            _ => {}
        }
    }
    let mut count = 0usize;
    walk(v, &mut count, max);
    count >= max
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("YAML payload too large (>{limit} bytes)")]
    TooLarge { limit: usize },
    #[error("document {doc}: YAML document too complex (>{limit} nodes)")]
    TooComplex { doc: usize, limit: usize },
    #[error("parsing YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("converting YAML to JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document {doc}: YAML missing apiVersion")]
    MissingApiVersion { doc: usize },
    #[error("document {doc}: YAML missing kind")]
    MissingKind { doc: usize },
    #[error("document {doc}: YAML missing metadata.name ({kind})")]
    MissingName { doc: usize, kind: String },
    #[error("document {doc}: unsupported kind {kind} ({api_version})")]
    UnsupportedKind { doc: usize, api_version: String, kind: String },
    #[error("document {doc}: decoding {kind} {name}: {source}")]
    Decode { doc: usize, kind: Kind, name: String, source: serde_json::Error },
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Namespace forced onto namespaced kinds.
    pub namespace: Option<String>,
    /// Skip documents of unsupported kinds instead of failing.
    pub skip_unsupported: bool,
}

/// A document left out because its kind has no codegen support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub doc: usize,
    pub api_version: String,
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct Loaded {
    pub objects: Vec<ResourceObject>,
    pub skipped: Vec<Skipped>,
}

/// Load every object in a (multi-document) YAML or JSON text, strictly.
pub fn load(text: &str, namespace: Option<&str>) -> Result<Vec<ResourceObject>, ManifestError> {
    let opts = LoadOptions { namespace: namespace.map(str::to_string), skip_unsupported: false };
    Ok(load_with(text, &opts)?.objects)
}

/// Load with explicit options. Empty documents are ignored and `kind: List`
/// documents contribute their items.
pub fn load_with(text: &str, opts: &LoadOptions) -> Result<Loaded, ManifestError> {
    let limit = max_yaml_bytes();
    if text.len() > limit {
        return Err(ManifestError::TooLarge { limit });
    }
    let mut out = Loaded::default();
    for (doc, de) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let val = serde_yaml::Value::deserialize(de)?;
        if val.is_null() { continue; }
        let json = serde_json::to_value(val)?;
        let nodes = max_yaml_nodes();
        if json_node_budget_exceeded(&json, nodes) {
            return Err(ManifestError::TooComplex { doc, limit: nodes });
        }
        counter!("codify_manifest_documents", 1u64);
        collect(json, doc, opts, &mut out)?;
    }
    debug!(objects = out.objects.len(), skipped = out.skipped.len(), "manifests loaded");
    Ok(out)
}

fn collect(json: Json, doc: usize, opts: &LoadOptions, out: &mut Loaded) -> Result<(), ManifestError> {
    let api_version = json.get("apiVersion").and_then(Json::as_str).ok_or(ManifestError::MissingApiVersion { doc })?.to_string();
    let kind = json.get("kind").and_then(Json::as_str).ok_or(ManifestError::MissingKind { doc })?.to_string();
    if kind == "List" || kind.ends_with("List") && json.get("items").is_some_and(Json::is_array) {
        if let Some(Json::Array(items)) = json.get("items") {
            for item in items.iter().cloned() {
                collect(item, doc, opts, out)?;
            }
        }
        return Ok(());
    }
    let name = json
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Json::as_str)
        .ok_or_else(|| ManifestError::MissingName { doc, kind: kind.clone() })?
        .to_string();
    let Some(k) = Kind::from_type_meta(&api_version, &kind) else {
        if opts.skip_unsupported {
            warn!(doc, %api_version, %kind, %name, "skipping unsupported kind");
            out.skipped.push(Skipped { doc, api_version, kind, name });
            return Ok(());
        }
        return Err(ManifestError::UnsupportedKind { doc, api_version, kind });
    };
    let mut obj = decode(k, json).map_err(|source| ManifestError::Decode { doc, kind: k, name: name.clone(), source })?;
    if let (Some(ns), true) = (opts.namespace.as_deref(), k.spec().namespaced) {
        obj.metadata_mut().namespace = Some(ns.to_string());
    }
    out.objects.push(obj);
    Ok(())
}

fn decode(kind: Kind, json: Json) -> Result<ResourceObject, serde_json::Error> {
    Ok(match kind {
        Kind::Deployment => ResourceObject::Deployment(serde_json::from_value(json)?),
        Kind::StatefulSet => ResourceObject::StatefulSet(serde_json::from_value(json)?),
        Kind::PodSecurityPolicy => ResourceObject::PodSecurityPolicy(serde_json::from_value(json)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEB: &str = "apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  selector:
    matchLabels: {app: web}
  template:
    metadata:
      labels: {app: web}
    spec:
      containers:
        - name: web
          image: nginx:latest
";

    #[test]
    fn parse_errors_are_friendly() {
        let e1 = load("kind: Foo\nmetadata:\n  name: x\n", None).unwrap_err().to_string();
        assert!(e1.contains("missing apiVersion"), "e1={}", e1);
        let e2 = load("apiVersion: v1\nmetadata:\n  name: x\n", None).unwrap_err().to_string();
        assert!(e2.contains("missing kind"), "e2={}", e2);
        let e3 = load("apiVersion: apps/v1\nkind: Deployment\nmetadata: {}\n", None).unwrap_err().to_string();
        assert!(e3.contains("missing metadata.name"), "e3={}", e3);
        let e4 = load("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: x\n", None).unwrap_err().to_string();
        assert!(e4.contains("unsupported kind ConfigMap (v1)"), "e4={}", e4);
    }

    #[test]
    fn multi_document_streams_skip_empty_docs() {
        let text = format!("---\n{WEB}---\n---\n{}", WEB.replace("name: web\nspec", "name: api\nspec"));
        let objs = load(&text, None).unwrap();
        assert_eq!(objs.iter().map(|o| o.name()).collect::<Vec<_>>(), ["web", "api"]);
        assert_eq!(objs[0].kind(), Kind::Deployment);
    }

    #[test]
    fn lists_are_flattened_and_namespace_override_applies() {
        let list = serde_json::json!({
            "apiVersion": "v1",
            "kind": "List",
            "items": [
                serde_yaml::from_str::<Json>(WEB).unwrap(),
                {"apiVersion": "policy/v1beta1", "kind": "PodSecurityPolicy", "metadata": {"name": "restricted"},
                 "spec": {"seLinux": {"rule": "RunAsAny"}, "runAsUser": {"rule": "RunAsAny"},
                          "supplementalGroups": {"rule": "RunAsAny"}, "fsGroup": {"rule": "RunAsAny"}}}
            ]
        });
        let objs = load(&list.to_string(), Some("prod")).unwrap();
        assert_eq!(objs.len(), 2);
        assert_eq!(objs[0].namespace(), Some("prod"));
        // Cluster-scoped kinds never get a namespace.
        assert_eq!(objs[1].namespace(), None);
    }

    #[test]
    fn unsupported_kinds_can_be_skipped() {
        let text = format!("apiVersion: v1\nkind: Service\nmetadata:\n  name: svc\n---\n{WEB}");
        let opts = LoadOptions { skip_unsupported: true, ..Default::default() };
        let loaded = load_with(&text, &opts).unwrap();
        assert_eq!(loaded.objects.len(), 1);
        assert_eq!(loaded.skipped, [Skipped { doc: 0, api_version: "v1".into(), kind: "Service".into(), name: "svc".into() }]);
    }

    #[test]
    fn decode_errors_name_the_object() {
        let bad = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  replicas: lots\n";
        let e = load(bad, None).unwrap_err();
        assert!(matches!(e, ManifestError::Decode { kind: Kind::Deployment, ref name, .. } if name == "web"));
    }

    #[test]
    fn node_budget_detects_large_graphs() {
        let v = serde_json::json!({"a": [1, 2, 3], "b": {"c": 4}});
        assert!(json_node_budget_exceeded(&v, 3));
        assert!(!json_node_budget_exceeded(&v, 100));
    }
}
