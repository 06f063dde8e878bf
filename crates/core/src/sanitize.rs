//! Sanitizer: strip server-populated and non-declarative fields before emission.

use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ResourceObject;

static DISALLOWED_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9 \-]+").expect("static regex"));

/// Return a copy of `obj` reduced to its declarative content.
///
/// Pure and idempotent. Removes timestamps, uid, resourceVersion, generation,
/// selfLink, managedFields, finalizers and deletion bookkeeping; resets status;
/// clears container resource requirements for pod-template-bearing kinds.
pub fn sanitize(obj: &ResourceObject) -> ResourceObject {
    let spec = obj.kind().spec();
    let mut out = obj.clone();
    *out.metadata_mut() = clean_object_meta(obj.metadata());
    match &mut out {
        ResourceObject::Deployment(d) => {
            if spec.clears_status { d.status = None; }
            if let Some(ds) = d.spec.as_mut() {
                clean_template_meta(&mut ds.template);
                if spec.strips_resources { strip_pod_resources(&mut ds.template); }
            }
        }
        ResourceObject::StatefulSet(s) => {
            if spec.clears_status { s.status = None; }
            if let Some(ss) = s.spec.as_mut() {
                clean_template_meta(&mut ss.template);
                if spec.strips_resources { strip_pod_resources(&mut ss.template); }
                // Claim templates carry their own server-populated metadata and status.
                if let Some(claims) = ss.volume_claim_templates.as_mut() {
                    for c in claims.iter_mut() {
                        c.metadata = clean_object_meta(&c.metadata);
                        c.status = None;
                    }
                }
            }
        }
        ResourceObject::PodSecurityPolicy(_) => {}
    }
    out
}

/// Opt in to the declarative metadata fields only.
pub fn clean_object_meta(m: &ObjectMeta) -> ObjectMeta {
    ObjectMeta {
        name: m.name.clone(),
        namespace: m.namespace.clone(),
        generate_name: m.generate_name.clone(),
        labels: m.labels.clone(),
        annotations: m.annotations.clone(),
        owner_references: m.owner_references.clone(),
        ..Default::default()
    }
}

fn clean_template_meta(template: &mut PodTemplateSpec) {
    if let Some(meta) = template.metadata.as_ref() {
        template.metadata = Some(clean_object_meta(meta));
    }
}

/// Resource sizing is frequently defaulted at admission; it is not a stable literal.
pub fn strip_pod_resources(template: &mut PodTemplateSpec) {
    let Some(pod) = template.spec.as_mut() else { return };
    for c in pod.containers.iter_mut() {
        c.resources = None;
    }
    if let Some(init) = pod.init_containers.as_mut() {
        for c in init.iter_mut() {
            c.resources = None;
        }
    }
}

/// Strip every character outside `[a-zA-Z0-9 -]` from an object name.
pub fn sanitize_object_name(name: &str) -> String {
    DISALLOWED_NAME_CHARS.replace_all(name, "").into_owned()
}
