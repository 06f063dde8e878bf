// Generated by codifyctl: shop.
// Copyright (c) 2024 Jo Doe <jo@example.com>
//
// Web shop and its database.
//
// Objects:
//   shop/web (Deployment)
//   shop/db (StatefulSet)
//   restricted (PodSecurityPolicy)

use k8s_openapi::api::apps::v1 as appsv1;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::util::intstr as intstr;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use k8s_openapi::api::policy::v1beta1 as policyv1beta1;
use k8s_openapi::apimachinery::pkg::api::resource as resource;
use codify_runtime::{Deployable, Registry};
pub struct App {
    meta: codify_runtime::ObjectMeta,
    registry: Registry,
}
impl App {
    pub fn new() -> Self {
        Self {
            meta: codify_runtime::ObjectMeta {
                name: Some("shop".to_string()),
                annotations: Some(
                    std::collections::BTreeMap::from([
                        ("description".to_string(), "Web shop and its database.".to_string()),
                    ]),
                ),
                ..Default::default()
            },
            registry: Registry::default(),
        }
    }
    async fn install_001_web_deployment(
        &mut self,
        client: Option<&kube::Client>,
    ) -> anyhow::Result<()> {
        let web_deployment: appsv1::Deployment = appsv1::Deployment {
            metadata: metav1::ObjectMeta {
                labels: Some(
                    std::collections::BTreeMap::from([
                        ("app".to_string(), "web".to_string()),
                    ]),
                ),
                name: Some("web".to_string()),
                namespace: Some("shop".to_string()),
                ..Default::default()
            },
            spec: Some(appsv1::DeploymentSpec {
                replicas: Some(2),
                selector: metav1::LabelSelector {
                    match_labels: Some(
                        std::collections::BTreeMap::from([
                            ("app".to_string(), "web".to_string()),
                        ]),
                    ),
                    ..Default::default()
                },
                template: corev1::PodTemplateSpec {
                    metadata: Some(metav1::ObjectMeta {
                        labels: Some(
                            std::collections::BTreeMap::from([
                                ("app".to_string(), "web".to_string()),
                            ]),
                        ),
                        ..Default::default()
                    }),
                    spec: Some(corev1::PodSpec {
                        containers: vec![
                            corev1::Container {
                                image: Some("nginx:1.25".to_string()),
                                name: "web".to_string(),
                                ports: Some(
                                    vec![
                                        corev1::ContainerPort {
                                            container_port: 8080,
                                            ..Default::default()
                                        },
                                    ],
                                ),
                                ..Default::default()
                            },
                        ],
                        topology_spread_constraints: Some(
                            vec![
                                corev1::TopologySpreadConstraint {
                                    max_skew: 1,
                                    min_domains: Some(2),
                                    topology_key: "topology.kubernetes.io/zone".to_string(),
                                    when_unsatisfiable: "DoNotSchedule".to_string(),
                                    ..Default::default()
                                },
                            ],
                        ),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        };
        self.registry.push(web_deployment.clone());
        if let Some(client) = client {
            let api = kube::Api::<appsv1::Deployment>::namespaced(client.clone(), "shop");
            api.create(&kube::api::PostParams::default(), &web_deployment).await?;
        }
        Ok(())
    }
    async fn install_002_db_stateful_set(
        &mut self,
        client: Option<&kube::Client>,
    ) -> anyhow::Result<()> {
        let db_stateful_set: appsv1::StatefulSet = appsv1::StatefulSet {
            metadata: metav1::ObjectMeta {
                name: Some("db".to_string()),
                namespace: Some("shop".to_string()),
                ..Default::default()
            },
            spec: Some(appsv1::StatefulSetSpec {
                selector: metav1::LabelSelector {
                    match_labels: Some(
                        std::collections::BTreeMap::from([
                            ("app".to_string(), "db".to_string()),
                        ]),
                    ),
                    ..Default::default()
                },
                service_name: "db".to_string(),
                template: corev1::PodTemplateSpec {
                    metadata: Some(metav1::ObjectMeta {
                        labels: Some(
                            std::collections::BTreeMap::from([
                                ("app".to_string(), "db".to_string()),
                            ]),
                        ),
                        ..Default::default()
                    }),
                    spec: Some(corev1::PodSpec {
                        containers: vec![
                            corev1::Container {
                                image: Some("postgres:16".to_string()),
                                name: "db".to_string(),
                                volume_mounts: Some(
                                    vec![
                                        corev1::VolumeMount {
                                            mount_path: "/var/lib/postgresql".to_string(),
                                            name: "data".to_string(),
                                            ..Default::default()
                                        },
                                    ],
                                ),
                                ..Default::default()
                            },
                        ],
                        volumes: Some(
                            vec![
                                corev1::Volume {
                                    aws_elastic_block_store: Some(corev1::AWSElasticBlockStoreVolumeSource {
                                        fs_type: Some("ext4".to_string()),
                                        volume_id: "vol-0abc".to_string(),
                                        ..Default::default()
                                    }),
                                    name: "backup".to_string(),
                                    ..Default::default()
                                },
                            ],
                        ),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                update_strategy: Some(appsv1::StatefulSetUpdateStrategy {
                    rolling_update: Some(appsv1::RollingUpdateStatefulSetStrategy {
                        max_unavailable: Some(intstr::IntOrString::Int(1)),
                        partition: Some(0),
                        ..Default::default()
                    }),
                    type_: Some("RollingUpdate".to_string()),
                    ..Default::default()
                }),
                volume_claim_templates: Some(
                    vec![
                        corev1::PersistentVolumeClaim {
                            metadata: metav1::ObjectMeta {
                                name: Some("data".to_string()),
                                ..Default::default()
                            },
                            spec: Some(corev1::PersistentVolumeClaimSpec {
                                access_modes: Some(vec!["ReadWriteOnce".to_string()]),
                                resources: Some(corev1::ResourceRequirements {
                                    requests: Some(
                                        std::collections::BTreeMap::from([
                                            (
                                                "storage".to_string(),
                                                resource::Quantity("1Gi".to_string()),
                                            ),
                                        ]),
                                    ),
                                    ..Default::default()
                                }),
                                ..Default::default()
                            }),
                            ..Default::default()
                        },
                    ],
                ),
                ..Default::default()
            }),
            ..Default::default()
        };
        self.registry.push(db_stateful_set.clone());
        if let Some(client) = client {
            let api = kube::Api::<appsv1::StatefulSet>::namespaced(client.clone(), "shop");
            api.create(&kube::api::PostParams::default(), &db_stateful_set).await?;
        }
        Ok(())
    }
    async fn install_003_restricted_pod_security_policy(
        &mut self,
        client: Option<&kube::Client>,
    ) -> anyhow::Result<()> {
        let restricted_pod_security_policy: policyv1beta1::PodSecurityPolicy = policyv1beta1::PodSecurityPolicy {
            metadata: metav1::ObjectMeta {
                name: Some("restricted".to_string()),
                ..Default::default()
            },
            spec: Some(policyv1beta1::PodSecurityPolicySpec {
                fs_group: policyv1beta1::FSGroupStrategyOptions {
                    rule: Some("RunAsAny".to_string()),
                    ..Default::default()
                },
                privileged: Some(false),
                run_as_user: policyv1beta1::RunAsUserStrategyOptions {
                    rule: "MustRunAsNonRoot".to_string(),
                    ..Default::default()
                },
                se_linux: policyv1beta1::SELinuxStrategyOptions {
                    rule: "RunAsAny".to_string(),
                    ..Default::default()
                },
                supplemental_groups: policyv1beta1::SupplementalGroupsStrategyOptions {
                    rule: Some("RunAsAny".to_string()),
                    ..Default::default()
                },
                volumes: Some(
                    vec!["configMap".to_string(), "persistentVolumeClaim".to_string()],
                ),
                ..Default::default()
            }),
            ..Default::default()
        };
        self.registry.push(restricted_pod_security_policy.clone());
        if let Some(client) = client {
            let api = kube::Api::<policyv1beta1::PodSecurityPolicy>::all(client.clone());
            api.create(&kube::api::PostParams::default(), &restricted_pod_security_policy)
                .await?;
        }
        Ok(())
    }
    async fn uninstall_001_web_deployment(
        &self,
        client: Option<&kube::Client>,
    ) -> anyhow::Result<()> {
        if let Some(client) = client {
            let api = kube::Api::<appsv1::Deployment>::namespaced(client.clone(), "shop");
            api.delete("web", &kube::api::DeleteParams::default()).await?;
        }
        Ok(())
    }
    async fn uninstall_002_db_stateful_set(
        &self,
        client: Option<&kube::Client>,
    ) -> anyhow::Result<()> {
        if let Some(client) = client {
            let api = kube::Api::<appsv1::StatefulSet>::namespaced(client.clone(), "shop");
            api.delete("db", &kube::api::DeleteParams::default()).await?;
        }
        Ok(())
    }
    async fn uninstall_003_restricted_pod_security_policy(
        &self,
        client: Option<&kube::Client>,
    ) -> anyhow::Result<()> {
        if let Some(client) = client {
            let api = kube::Api::<policyv1beta1::PodSecurityPolicy>::all(client.clone());
            api.delete("restricted", &kube::api::DeleteParams::default()).await?;
        }
        Ok(())
    }
}
#[codify_runtime::async_trait]
impl Deployable for App {
    async fn install(&mut self, client: Option<&kube::Client>) -> anyhow::Result<()> {
        self.install_001_web_deployment(client).await?;
        self.install_002_db_stateful_set(client).await?;
        self.install_003_restricted_pod_security_policy(client).await?;
        Ok(())
    }
    async fn uninstall(&self, client: Option<&kube::Client>) -> anyhow::Result<()> {
        self.uninstall_001_web_deployment(client).await?;
        self.uninstall_002_db_stateful_set(client).await?;
        self.uninstall_003_restricted_pod_security_policy(client).await?;
        Ok(())
    }
    fn meta(&self) -> &codify_runtime::ObjectMeta {
        &self.meta
    }
    fn registry(&self) -> &Registry {
        &self.registry
    }
}
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    codify_runtime::run_command_line(App::new()).await
}
