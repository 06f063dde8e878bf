//! `Literal` for the k8s-openapi types reachable from the supported kinds.

use codify_core::kind::{PKG_APPS_V1, PKG_CORE_V1, PKG_INTSTR, PKG_META_V1, PKG_POLICY_V1BETA1, PKG_RESOURCE};
use codify_core::ResourceObject;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{FieldsV1, MicroTime, Time};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::node::{Node, Scalar};
use crate::Literal;

/// Declare a package's record types and export their names.
///
/// Every field of every listed type must appear: a missing one compiles but
/// makes `emit_checked` report the object as unfaithful.
macro_rules! records {
    ($list:ident in $pkg:expr; $($ty:ident $(: $res:ident)? { $($field:ident $(as $json:literal)?),* $(,)? })*) => {
        $($crate::literal_record!($pkg => $ty $(: $res)? { $($field $(as $json)?),* });)*

        pub const $list: &[&str] = &[$(stringify!($ty)),*];
    };
}

pub use apps::APPS_V1_RECORDS;
pub use core_v1::CORE_V1_RECORDS;
pub use meta::META_V1_RECORDS;
pub use policy::POLICY_V1BETA1_RECORDS;

mod apps {
    use super::*;
    use k8s_openapi::api::apps::v1::*;

    records! { APPS_V1_RECORDS in PKG_APPS_V1;
        Deployment: resource { metadata, spec, status }
        StatefulSet: resource { metadata, spec, status }
        DeploymentSpec {
            min_ready_seconds, paused, progress_deadline_seconds, replicas, revision_history_limit,
            selector, strategy, template,
        }
        DeploymentStatus {
            available_replicas, collision_count, conditions, observed_generation, ready_replicas,
            replicas, unavailable_replicas, updated_replicas,
        }
        StatefulSetSpec {
            min_ready_seconds, persistent_volume_claim_retention_policy, pod_management_policy,
            replicas, revision_history_limit, selector, service_name, template, update_strategy,
            volume_claim_templates,
        }
        StatefulSetStatus {
            available_replicas, collision_count, conditions, current_replicas, current_revision,
            observed_generation, ready_replicas, replicas, update_revision, updated_replicas,
        }
        DeploymentStrategy { rolling_update, type_ }
        DeploymentCondition { last_transition_time, last_update_time, message, reason, status, type_ }
        StatefulSetPersistentVolumeClaimRetentionPolicy { when_deleted, when_scaled }
        StatefulSetUpdateStrategy { rolling_update, type_ }
        StatefulSetCondition { last_transition_time, message, reason, status, type_ }
        RollingUpdateDeployment { max_surge, max_unavailable }
        RollingUpdateStatefulSetStrategy { max_unavailable, partition }
    }
}

mod meta {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::*;

    records! { META_V1_RECORDS in PKG_META_V1;
        ObjectMeta {
            annotations, cluster_name, creation_timestamp, deletion_grace_period_seconds,
            deletion_timestamp, finalizers, generate_name, generation, labels, managed_fields, name,
            namespace, owner_references, resource_version, self_link, uid,
        }
        ManagedFieldsEntry { api_version, fields_type, fields_v1, manager, operation, subresource, time }
        OwnerReference { api_version, block_owner_deletion, controller, kind, name, uid }
        LabelSelector { match_expressions, match_labels }
        LabelSelectorRequirement { key, operator, values }
    }
}

mod core_v1 {
    use super::*;
    use k8s_openapi::api::core::v1::*;

    records! { CORE_V1_RECORDS in PKG_CORE_V1;
        PodTemplateSpec { metadata, spec }
        PersistentVolumeClaim: resource { metadata, spec, status }
        PodSpec {
            active_deadline_seconds, affinity, automount_service_account_token, containers,
            dns_config, dns_policy, enable_service_links, ephemeral_containers, host_aliases,
            host_ipc as "hostIPC", host_network, host_pid as "hostPID", hostname,
            image_pull_secrets, init_containers, node_name, node_selector, os, overhead,
            preemption_policy, priority, priority_class_name, readiness_gates, restart_policy,
            runtime_class_name, scheduler_name, security_context, service_account,
            service_account_name, set_hostname_as_fqdn as "setHostnameAsFQDN",
            share_process_namespace, subdomain, termination_grace_period_seconds, tolerations,
            topology_spread_constraints, volumes,
        }
        PersistentVolumeClaimSpec {
            access_modes, data_source, data_source_ref, resources, selector, storage_class_name,
            volume_mode, volume_name,
        }
        PersistentVolumeClaimStatus {
            access_modes, allocated_resources, capacity, conditions, phase, resize_status,
        }
        SELinuxOptions { level, role, type_, user }
        Affinity { node_affinity, pod_affinity, pod_anti_affinity }
        Container {
            args, command, env, env_from, image, image_pull_policy, lifecycle, liveness_probe, name,
            ports, readiness_probe, resources, security_context, startup_probe, stdin, stdin_once,
            termination_message_path, termination_message_policy, tty, volume_devices,
            volume_mounts, working_dir,
        }
        PodDNSConfig { nameservers, options, searches }
        EphemeralContainer {
            args, command, env, env_from, image, image_pull_policy, lifecycle, liveness_probe, name,
            ports, readiness_probe, resources, security_context, startup_probe, stdin, stdin_once,
            target_container_name, termination_message_path, termination_message_policy, tty,
            volume_devices, volume_mounts, working_dir,
        }
        HostAlias { hostnames, ip }
        LocalObjectReference { name }
        PodOS { name }
        PodReadinessGate { condition_type }
        PodSecurityContext {
            fs_group, fs_group_change_policy, run_as_group, run_as_non_root, run_as_user,
            se_linux_options, seccomp_profile, supplemental_groups, sysctls, windows_options,
        }
        Toleration { effect, key, operator, toleration_seconds, value }
        TopologySpreadConstraint { label_selector, max_skew, min_domains, topology_key, when_unsatisfiable }
        Volume {
            aws_elastic_block_store, azure_disk, azure_file, cephfs, cinder, config_map, csi,
            downward_api as "downwardAPI", empty_dir, ephemeral, fc, flex_volume, flocker,
            gce_persistent_disk, git_repo, glusterfs, host_path, iscsi, name, nfs,
            persistent_volume_claim, photon_persistent_disk, portworx_volume, projected, quobyte,
            rbd, scale_io as "scaleIO", secret, storageos, vsphere_volume,
        }
        TypedLocalObjectReference { api_group, kind, name }
        ResourceRequirements { limits, requests }
        PersistentVolumeClaimCondition {
            last_probe_time, last_transition_time, message, reason, status, type_,
        }
        NodeAffinity {
            preferred_during_scheduling_ignored_during_execution,
            required_during_scheduling_ignored_during_execution,
        }
        PodAffinity {
            preferred_during_scheduling_ignored_during_execution,
            required_during_scheduling_ignored_during_execution,
        }
        PodAntiAffinity {
            preferred_during_scheduling_ignored_during_execution,
            required_during_scheduling_ignored_during_execution,
        }
        EnvVar { name, value, value_from }
        EnvFromSource { config_map_ref, prefix, secret_ref }
        Lifecycle { post_start, pre_stop }
        Probe {
            exec, failure_threshold, grpc, http_get, initial_delay_seconds, period_seconds,
            success_threshold, tcp_socket, termination_grace_period_seconds, timeout_seconds,
        }
        ContainerPort { container_port, host_ip as "hostIP", host_port, name, protocol }
        SecurityContext {
            allow_privilege_escalation, capabilities, privileged, proc_mount,
            read_only_root_filesystem, run_as_group, run_as_non_root, run_as_user, se_linux_options,
            seccomp_profile, windows_options,
        }
        VolumeDevice { device_path, name }
        VolumeMount { mount_path, mount_propagation, name, read_only, sub_path, sub_path_expr }
        PodDNSConfigOption { name, value }
        SeccompProfile { localhost_profile, type_ }
        Sysctl { name, value }
        WindowsSecurityContextOptions {
            gmsa_credential_spec, gmsa_credential_spec_name, host_process, run_as_user_name,
        }
        AWSElasticBlockStoreVolumeSource { fs_type, partition, read_only, volume_id as "volumeID" }
        AzureDiskVolumeSource { caching_mode, disk_name, disk_uri as "diskURI", fs_type, kind, read_only }
        AzureFileVolumeSource { read_only, secret_name, share_name }
        CephFSVolumeSource { monitors, path, read_only, secret_file, secret_ref, user }
        CinderVolumeSource { fs_type, read_only, secret_ref, volume_id as "volumeID" }
        ConfigMapVolumeSource { default_mode, items, name, optional }
        CSIVolumeSource { driver, fs_type, node_publish_secret_ref, read_only, volume_attributes }
        DownwardAPIVolumeSource { default_mode, items }
        EmptyDirVolumeSource { medium, size_limit }
        EphemeralVolumeSource { volume_claim_template }
        FCVolumeSource { fs_type, lun, read_only, target_wwns as "targetWWNs", wwids }
        FlexVolumeSource { driver, fs_type, options, read_only, secret_ref }
        FlockerVolumeSource { dataset_name, dataset_uuid as "datasetUUID" }
        GCEPersistentDiskVolumeSource { fs_type, partition, pd_name, read_only }
        GitRepoVolumeSource { directory, repository, revision }
        GlusterfsVolumeSource { endpoints, path, read_only }
        HostPathVolumeSource { path, type_ }
        ISCSIVolumeSource {
            chap_auth_discovery, chap_auth_session, fs_type, initiator_name, iqn, iscsi_interface,
            lun, portals, read_only, secret_ref, target_portal,
        }
        NFSVolumeSource { path, read_only, server }
        PersistentVolumeClaimVolumeSource { claim_name, read_only }
        PhotonPersistentDiskVolumeSource { fs_type, pd_id as "pdID" }
        PortworxVolumeSource { fs_type, read_only, volume_id as "volumeID" }
        ProjectedVolumeSource { default_mode, sources }
        QuobyteVolumeSource { group, read_only, registry, tenant, user, volume }
        RBDVolumeSource { fs_type, image, keyring, monitors, pool, read_only, secret_ref, user }
        ScaleIOVolumeSource {
            fs_type, gateway, protection_domain, read_only, secret_ref, ssl_enabled, storage_mode,
            storage_pool, system, volume_name,
        }
        SecretVolumeSource { default_mode, items, optional, secret_name }
        StorageOSVolumeSource { fs_type, read_only, secret_ref, volume_name, volume_namespace }
        VsphereVirtualDiskVolumeSource {
            fs_type, storage_policy_id as "storagePolicyID", storage_policy_name, volume_path,
        }
        PreferredSchedulingTerm { preference, weight }
        NodeSelector { node_selector_terms }
        WeightedPodAffinityTerm { pod_affinity_term, weight }
        PodAffinityTerm { label_selector, namespace_selector, namespaces, topology_key }
        EnvVarSource { config_map_key_ref, field_ref, resource_field_ref, secret_key_ref }
        ConfigMapEnvSource { name, optional }
        SecretEnvSource { name, optional }
        LifecycleHandler { exec, http_get, tcp_socket }
        ExecAction { command }
        GRPCAction { port, service }
        HTTPGetAction { host, http_headers, path, port, scheme }
        TCPSocketAction { host, port }
        Capabilities { add, drop }
        KeyToPath { key, mode, path }
        DownwardAPIVolumeFile { field_ref, mode, path, resource_field_ref }
        PersistentVolumeClaimTemplate { metadata, spec }
        VolumeProjection { config_map, downward_api as "downwardAPI", secret, service_account_token }
        NodeSelectorTerm { match_expressions, match_fields }
        ConfigMapKeySelector { key, name, optional }
        ObjectFieldSelector { api_version, field_path }
        ResourceFieldSelector { container_name, divisor, resource }
        SecretKeySelector { key, name, optional }
        HTTPHeader { name, value }
        ConfigMapProjection { items, name, optional }
        DownwardAPIProjection { items }
        SecretProjection { items, name, optional }
        ServiceAccountTokenProjection { audience, expiration_seconds, path }
        NodeSelectorRequirement { key, operator, values }
    }
}

mod policy {
    use super::*;
    use k8s_openapi::api::policy::v1beta1::*;

    records! { POLICY_V1BETA1_RECORDS in PKG_POLICY_V1BETA1;
        PodSecurityPolicy: resource { metadata, spec }
        PodSecurityPolicySpec {
            allow_privilege_escalation, allowed_csi_drivers as "allowedCSIDrivers",
            allowed_capabilities, allowed_flex_volumes, allowed_host_paths,
            allowed_proc_mount_types, allowed_unsafe_sysctls, default_add_capabilities,
            default_allow_privilege_escalation, forbidden_sysctls, fs_group, host_ipc as "hostIPC",
            host_network, host_pid as "hostPID", host_ports, privileged, read_only_root_filesystem,
            required_drop_capabilities, run_as_group, run_as_user, runtime_class, se_linux,
            supplemental_groups, volumes,
        }
        AllowedCSIDriver { name }
        AllowedFlexVolume { driver }
        AllowedHostPath { path_prefix, read_only }
        FSGroupStrategyOptions { ranges, rule }
        HostPortRange { max, min }
        RunAsGroupStrategyOptions { ranges, rule }
        RunAsUserStrategyOptions { ranges, rule }
        RuntimeClassStrategyOptions { allowed_runtime_class_names, default_runtime_class_name }
        SELinuxStrategyOptions { rule, se_linux_options }
        SupplementalGroupsStrategyOptions { ranges, rule }
        IDRange { max, min }
    }
}

impl Literal for Quantity {
    fn to_node(&self) -> Node { Node::tuple(PKG_RESOURCE, "Quantity", self.0.to_node()) }
}

impl Literal for IntOrString {
    fn to_node(&self) -> Node {
        match self {
            IntOrString::Int(i) => Node::variant(PKG_INTSTR, "IntOrString", "Int", i.to_node()),
            IntOrString::String(s) => Node::variant(PKG_INTSTR, "IntOrString", "String", s.to_node()),
        }
    }
}

// Same text the types put on the wire, so the fidelity check compares equal.
impl Literal for Time {
    fn to_node(&self) -> Node {
        let ts = self.0.to_rfc3339_opts(k8s_openapi::chrono::SecondsFormat::Secs, true);
        Node::tuple(PKG_META_V1, "Time", Node::Scalar(Scalar::Timestamp(ts)))
    }
}

impl Literal for MicroTime {
    fn to_node(&self) -> Node {
        let ts = self.0.to_rfc3339_opts(k8s_openapi::chrono::SecondsFormat::Micros, true);
        Node::tuple(PKG_META_V1, "MicroTime", Node::Scalar(Scalar::Timestamp(ts)))
    }
}

// Server-side apply bookkeeping: arbitrary JSON with no typed literal.
impl Literal for FieldsV1 {
    fn to_node(&self) -> Node { Node::opaque("FieldsV1") }
}

impl Literal for ResourceObject {
    fn to_node(&self) -> Node {
        match self {
            ResourceObject::Deployment(o) => o.to_node(),
            ResourceObject::StatefulSet(o) => o.to_node(),
            ResourceObject::PodSecurityPolicy(o) => o.to_node(),
        }
    }
}
