//! Supported kinds and the per-kind variation points.

/// Canonical module paths of the packages the supported kinds live in.
pub const PKG_APPS_V1: &str = "k8s_openapi::api::apps::v1";
pub const PKG_CORE_V1: &str = "k8s_openapi::api::core::v1";
pub const PKG_POLICY_V1BETA1: &str = "k8s_openapi::api::policy::v1beta1";
pub const PKG_META_V1: &str = "k8s_openapi::apimachinery::pkg::apis::meta::v1";
pub const PKG_RESOURCE: &str = "k8s_openapi::apimachinery::pkg::api::resource";
pub const PKG_INTSTR: &str = "k8s_openapi::apimachinery::pkg::util::intstr";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Deployment,
    StatefulSet,
    PodSecurityPolicy,
}

/// Everything that differs between installable kinds.
///
/// - `package`/`default_alias`: where the typed object lives and the alias its
///   generated code is written against
/// - `namespaced`: namespaced collection vs cluster-scoped collection
/// - `clears_status`: the status subtree is reset to its zero value
/// - `strips_resources`: pod-template-bearing kinds lose container resource requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
    pub kind: Kind,
    pub name: &'static str,
    pub api_version: &'static str,
    pub package: &'static str,
    pub default_alias: &'static str,
    pub namespaced: bool,
    pub clears_status: bool,
    pub strips_resources: bool,
}

const DEPLOYMENT: KindSpec = KindSpec {
    kind: Kind::Deployment,
    name: "Deployment",
    api_version: "apps/v1",
    package: PKG_APPS_V1,
    default_alias: "appsv1",
    namespaced: true,
    clears_status: true,
    strips_resources: true,
};

const STATEFUL_SET: KindSpec = KindSpec {
    kind: Kind::StatefulSet,
    name: "StatefulSet",
    api_version: "apps/v1",
    package: PKG_APPS_V1,
    default_alias: "appsv1",
    namespaced: true,
    clears_status: true,
    strips_resources: true,
};

const POD_SECURITY_POLICY: KindSpec = KindSpec {
    kind: Kind::PodSecurityPolicy,
    name: "PodSecurityPolicy",
    api_version: "policy/v1beta1",
    package: PKG_POLICY_V1BETA1,
    default_alias: "policyv1beta1",
    namespaced: false,
    clears_status: false,
    strips_resources: false,
};

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Deployment, Kind::StatefulSet, Kind::PodSecurityPolicy];

    pub fn spec(self) -> &'static KindSpec {
        match self {
            Kind::Deployment => &DEPLOYMENT,
            Kind::StatefulSet => &STATEFUL_SET,
            Kind::PodSecurityPolicy => &POD_SECURITY_POLICY,
        }
    }

    /// Look up a kind from the `apiVersion`/`kind` pair of a manifest.
    pub fn from_type_meta(api_version: &str, kind: &str) -> Option<Kind> {
        Kind::ALL
            .into_iter()
            .find(|k| k.spec().api_version == api_version && k.spec().name == kind)
    }

    pub fn name(self) -> &'static str { self.spec().name }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_meta_lookup_requires_matching_group_version() {
        assert_eq!(Kind::from_type_meta("apps/v1", "Deployment"), Some(Kind::Deployment));
        assert_eq!(Kind::from_type_meta("apps/v1", "StatefulSet"), Some(Kind::StatefulSet));
        assert_eq!(Kind::from_type_meta("policy/v1beta1", "PodSecurityPolicy"), Some(Kind::PodSecurityPolicy));
        assert_eq!(Kind::from_type_meta("extensions/v1beta1", "Deployment"), None);
        assert_eq!(Kind::from_type_meta("v1", "ConfigMap"), None);
    }

    #[test]
    fn pod_template_kinds_strip_resources() {
        for k in Kind::ALL {
            let s = k.spec();
            assert_eq!(s.kind, k);
            assert_eq!(s.strips_resources, matches!(k, Kind::Deployment | Kind::StatefulSet));
        }
        assert!(!Kind::PodSecurityPolicy.spec().namespaced);
    }
}
