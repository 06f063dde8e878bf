//! Alias table: canonical package paths, their import aliases, and the
//! per-origin override lists used when several packages share one short name.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::kind::{PKG_APPS_V1, PKG_CORE_V1, PKG_INTSTR, PKG_META_V1, PKG_POLICY_V1BETA1, PKG_RESOURCE};

/// Origin of an override list.
///
/// Lists are applied in variant order (the derived `Ord`): apps, meta, core, policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    Apps,
    Meta,
    Core,
    Policy,
}

/// Type names that must use `alias` even where the generic substitution picks another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideList {
    pub origin: Origin,
    pub alias: String,
    pub types: BTreeSet<String>,
}

impl OverrideList {
    pub fn new<I, S>(origin: Origin, alias: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { origin, alias: alias.into(), types: types.into_iter().map(Into::into).collect() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasTableError {
    #[error("alias `{alias}` maps both `{first}` and `{second}`")]
    DuplicateAlias { alias: String, first: String, second: String },
    #[error("override list {origin:?} declared twice")]
    DuplicateOrigin { origin: Origin },
    #[error("override list {origin:?} uses alias `{alias}` that no package maps to")]
    UnknownOverrideAlias { origin: Origin, alias: String },
}

/// Immutable alias configuration, built once and passed to whoever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    defaults: BTreeMap<String, String>,
    overrides: Vec<OverrideList>,
}

impl AliasTable {
    /// Build a table, rejecting aliases shared by two packages.
    pub fn new<I, P, A>(defaults: I, mut overrides: Vec<OverrideList>) -> Result<Self, AliasTableError>
    where
        I: IntoIterator<Item = (P, A)>,
        P: Into<String>,
        A: Into<String>,
    {
        let defaults: BTreeMap<String, String> =
            defaults.into_iter().map(|(p, a)| (p.into(), a.into())).collect();
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for (pkg, alias) in defaults.iter() {
            if let Some(first) = seen.insert(alias.as_str(), pkg.as_str()) {
                return Err(AliasTableError::DuplicateAlias {
                    alias: alias.clone(),
                    first: first.to_string(),
                    second: pkg.clone(),
                });
            }
        }
        overrides.sort_by_key(|l| l.origin);
        for pair in overrides.windows(2) {
            if pair[0].origin == pair[1].origin {
                return Err(AliasTableError::DuplicateOrigin { origin: pair[0].origin });
            }
        }
        for list in overrides.iter() {
            if !seen.contains_key(list.alias.as_str()) {
                return Err(AliasTableError::UnknownOverrideAlias { origin: list.origin, alias: list.alias.clone() });
            }
        }
        Ok(Self { defaults, overrides })
    }

    /// The table used for Kubernetes objects backed by `k8s-openapi`.
    pub fn kubernetes() -> Self {
        let defaults = [
            ("k8s_openapi::api::admissionregistration::v1", "admissionregistrationv1"),
            (PKG_APPS_V1, "appsv1"),
            ("k8s_openapi::api::batch::v1", "batchv1"),
            (PKG_CORE_V1, "corev1"),
            ("k8s_openapi::api::networking::v1", "networkingv1"),
            (PKG_POLICY_V1BETA1, "policyv1beta1"),
            ("k8s_openapi::api::rbac::v1", "rbacv1"),
            ("k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1", "apiextensionsv1"),
            (PKG_RESOURCE, "resource"),
            (PKG_META_V1, "metav1"),
            (PKG_INTSTR, "intstr"),
        ];
        Self {
            defaults: defaults.into_iter().map(|(p, a)| (p.to_string(), a.to_string())).collect(),
            overrides: vec![
                OverrideList::new(Origin::Apps, "appsv1", APPS_V1_TYPES.iter().copied()),
                OverrideList::new(Origin::Meta, "metav1", META_V1_TYPES.iter().copied()),
                OverrideList::new(Origin::Core, "corev1", CORE_V1_TYPES.iter().copied()),
                OverrideList::new(Origin::Policy, "policyv1beta1", POLICY_V1BETA1_TYPES.iter().copied()),
            ],
        }
    }

    pub fn package_for(&self, alias: &str) -> Option<&str> {
        self.defaults.iter().find(|(_, a)| a.as_str() == alias).map(|(p, _)| p.as_str())
    }

    /// `(package, alias)` pairs in package order.
    pub fn packages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults.iter().map(|(p, a)| (p.as_str(), a.as_str()))
    }

    pub fn overrides(&self) -> &[OverrideList] {
        &self.overrides
    }

    /// Alias forced for `type_name` by the override lists.
    ///
    /// Lists apply in origin order and a later list re-rewrites what an earlier
    /// one produced, so the last list claiming the name wins.
    pub fn override_for(&self, type_name: &str) -> Option<&str> {
        self.overrides
            .iter()
            .filter(|l| l.types.contains(type_name))
            .last()
            .map(|l| l.alias.as_str())
    }

    /// Short display name of an alias: the last segment of its package (`appsv1` -> `v1`).
    pub fn display_name(&self, alias: &str) -> Option<&str> {
        self.package_for(alias).and_then(|p| p.rsplit("::").next())
    }
}

/// A bare API version token (`v1`, `v1beta1`, `v2alpha1`) is the generic
/// placeholder qualifier the emitter writes for its home packages.
pub fn is_generic_token(token: &str) -> bool {
    let Some(rest) = token.strip_prefix('v') else { return false };
    let major_len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if major_len == 0 { return false; }
    let rest = &rest[major_len..];
    if rest.is_empty() { return true; }
    let tail = rest.strip_prefix("alpha").or_else(|| rest.strip_prefix("beta"));
    matches!(tail, Some(t) if !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
}

pub const APPS_V1_TYPES: &[&str] = &[
    "ControllerRevision",
    "DaemonSet",
    "Deployment",
    "DeploymentCondition",
    "DeploymentSpec",
    "DeploymentStatus",
    "DeploymentStrategy",
    "ReplicaSet",
    "RollingUpdateDeployment",
    "RollingUpdateStatefulSetStrategy",
    "StatefulSet",
    "StatefulSetCondition",
    "StatefulSetPersistentVolumeClaimRetentionPolicy",
    "StatefulSetSpec",
    "StatefulSetStatus",
    "StatefulSetUpdateStrategy",
];

pub const META_V1_TYPES: &[&str] = &[
    "APIGroup",
    "Condition",
    "CreateOptions",
    "DeleteOptions",
    "FieldsV1",
    "LabelSelector",
    "LabelSelectorRequirement",
    "ListMeta",
    "ManagedFieldsEntry",
    "MicroTime",
    "ObjectMeta",
    "OwnerReference",
    "Time",
];

pub const CORE_V1_TYPES: &[&str] = &[
    "AWSElasticBlockStoreVolumeSource",
    "Affinity",
    "AzureDiskVolumeSource",
    "AzureFileVolumeSource",
    "CSIVolumeSource",
    "Capabilities",
    "CephFSVolumeSource",
    "CinderVolumeSource",
    "ConfigMapEnvSource",
    "ConfigMapKeySelector",
    "ConfigMapProjection",
    "ConfigMapVolumeSource",
    "Container",
    "ContainerPort",
    "DownwardAPIProjection",
    "DownwardAPIVolumeFile",
    "DownwardAPIVolumeSource",
    "EmptyDirVolumeSource",
    "EnvFromSource",
    "EnvVar",
    "EnvVarSource",
    "EphemeralContainer",
    "EphemeralVolumeSource",
    "ExecAction",
    "FCVolumeSource",
    "FlexVolumeSource",
    "FlockerVolumeSource",
    "GCEPersistentDiskVolumeSource",
    "GRPCAction",
    "GitRepoVolumeSource",
    "GlusterfsVolumeSource",
    "HTTPGetAction",
    "HTTPHeader",
    "HostAlias",
    "HostPathVolumeSource",
    "ISCSIVolumeSource",
    "KeyToPath",
    "Lifecycle",
    "LifecycleHandler",
    "LocalObjectReference",
    "NFSVolumeSource",
    "NodeAffinity",
    "NodeSelector",
    "NodeSelectorRequirement",
    "NodeSelectorTerm",
    "ObjectFieldSelector",
    "PersistentVolumeClaim",
    "PersistentVolumeClaimCondition",
    "PersistentVolumeClaimSpec",
    "PersistentVolumeClaimStatus",
    "PersistentVolumeClaimTemplate",
    "PersistentVolumeClaimVolumeSource",
    "PhotonPersistentDiskVolumeSource",
    "PodAffinity",
    "PodAffinityTerm",
    "PodAntiAffinity",
    "PodDNSConfig",
    "PodDNSConfigOption",
    "PodOS",
    "PodReadinessGate",
    "PodSecurityContext",
    "PodSpec",
    "PodTemplateSpec",
    "PortworxVolumeSource",
    "PreferredSchedulingTerm",
    "Probe",
    "ProjectedVolumeSource",
    "QuobyteVolumeSource",
    "RBDVolumeSource",
    "ResourceFieldSelector",
    "ResourceRequirements",
    "SELinuxOptions",
    "ScaleIOVolumeSource",
    "SeccompProfile",
    "SecretEnvSource",
    "SecretKeySelector",
    "SecretProjection",
    "SecretVolumeSource",
    "SecurityContext",
    "ServiceAccountTokenProjection",
    "StorageOSVolumeSource",
    "Sysctl",
    "TCPSocketAction",
    "Toleration",
    "TopologySpreadConstraint",
    "TypedLocalObjectReference",
    "Volume",
    "VolumeDevice",
    "VolumeMount",
    "VolumeProjection",
    "VsphereVirtualDiskVolumeSource",
    "WeightedPodAffinityTerm",
    "WindowsSecurityContextOptions",
];

pub const POLICY_V1BETA1_TYPES: &[&str] = &[
    "AllowedCSIDriver",
    "AllowedFlexVolume",
    "AllowedHostPath",
    "FSGroupStrategyOptions",
    "HostPortRange",
    "IDRange",
    "PodSecurityPolicy",
    "PodSecurityPolicySpec",
    "RunAsGroupStrategyOptions",
    "RunAsUserStrategyOptions",
    "RuntimeClassStrategyOptions",
    "SELinuxStrategyOptions",
    "SupplementalGroupsStrategyOptions",
];
