// ============================================================================
// Platform Infrastructure - Kubernetes Control Plane
// File: crates/platform-infrastructure/src/cluster/kube_client.rs
// ============================================================================
//! Talks to the Kubernetes API server through `kube`: core/v1 for
//! namespaces, pods, services and nodes, apps/v1 for deployments.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Node, Pod, Service};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::config::{InferConfigError, KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Client, Config};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, error, info};

use platform_core::clients::ClusterControlPlane;
use platform_core::domain::{ClusterNamespace, ClusterNode, NodeCondition, NodeResources, NodeTaint};
use platform_core::error::DomainError;
use platform_shared::config::ClusterSettings;

const KUBECONFIG_USER: &str = "platform-api";

#[derive(Debug, Error)]
pub enum ClusterSetupError {
    #[error("invalid cluster settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("failed to load cluster config: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    #[error("failed to infer cluster config: {0}")]
    Infer(#[from] InferConfigError),

    #[error("failed to build cluster client: {0}")]
    Client(#[from] kube::Error),
}

pub struct KubeControlPlane {
    client: Client,
    endpoint: String,
}

impl KubeControlPlane {
    /// An empty `api_server` falls back to the in-cluster or local kubeconfig.
    pub async fn from_settings(settings: &ClusterSettings) -> Result<Self, ClusterSetupError> {
        let mut config = if settings.api_server.trim().is_empty() {
            Config::infer().await?
        } else {
            let kubeconfig: Kubeconfig = serde_json::from_value(kubeconfig_document(settings))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
        };

        let timeout = Duration::from_secs(settings.timeout_secs);
        config.connect_timeout = Some(timeout);
        config.read_timeout = Some(timeout);

        let endpoint = config.cluster_url.to_string().trim_end_matches('/').to_string();
        let client = Client::try_from(config)?;

        info!(api_server = %endpoint, cluster = %settings.name, "Cluster client configured");
        Ok(Self { client, endpoint })
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }
}

/// Single-context kubeconfig carrying the configured server, CA and credentials.
fn kubeconfig_document(settings: &ClusterSettings) -> Value {
    let mut cluster = Map::new();
    cluster.insert("server".into(), json!(settings.api_server.trim_end_matches('/')));
    if settings.accept_invalid_certs {
        cluster.insert("insecure-skip-tls-verify".into(), json!(true));
    } else if let Some(path) = &settings.ca_cert_file {
        cluster.insert("certificate-authority".into(), json!(path));
    }

    let mut user = Map::new();
    match (&settings.token, &settings.token_file) {
        (Some(token), _) => {
            user.insert("token".into(), json!(token));
        }
        (None, Some(path)) => {
            user.insert("tokenFile".into(), json!(path));
        }
        (None, None) => {}
    }

    json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{ "name": settings.name, "cluster": cluster }],
        "users": [{ "name": KUBECONFIG_USER, "user": user }],
        "contexts": [{
            "name": settings.name,
            "context": { "cluster": settings.name, "user": KUBECONFIG_USER }
        }],
        "current-context": settings.name,
    })
}

fn backend_error(operation: &str, target: &str, err: kube::Error) -> DomainError {
    error!(operation, target, "Cluster request failed: {}", err);
    DomainError::backend(operation, target, err)
}

// Time wraps a different instant type across k8s-openapi releases; both
// serialize to RFC 3339.
fn timestamp(time: Option<&Time>) -> Option<DateTime<Utc>> {
    let value = serde_json::to_value(time?).ok()?;
    serde_json::from_value(value).ok()
}

fn quantity(list: &BTreeMap<String, Quantity>, key: &str) -> String {
    list.get(key).map(|q| q.0.clone()).unwrap_or_default()
}

fn resources(list: Option<BTreeMap<String, Quantity>>) -> Option<NodeResources> {
    list.map(|list| NodeResources {
        cpu: quantity(&list, "cpu"),
        memory: quantity(&list, "memory"),
    })
}

#[async_trait]
impl ClusterControlPlane for KubeControlPlane {
    async fn create_namespace(
        &self,
        name: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<(), DomainError> {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            ..Default::default()
        };
        self.namespaces()
            .create(&PostParams::default(), &namespace)
            .await
            .map_err(|e| backend_error("create_namespace", name, e))?;

        info!(namespace = name, "Namespace created");
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), DomainError> {
        self.namespaces()
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| backend_error("delete_namespace", name, e))?;

        info!(namespace = name, "Namespace deletion requested");
        Ok(())
    }

    async fn namespace_exists(&self, name: &str) -> Result<bool, DomainError> {
        match self.namespaces().get(name).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(response)) if response.code == 404 => Ok(false),
            Err(e) => Err(backend_error("namespace_exists", name, e)),
        }
    }

    async fn pod_count(&self, namespace: &str) -> Result<usize, DomainError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = pods
            .list(&ListParams::default())
            .await
            .map_err(|e| backend_error("pod_count", namespace, e))?;
        Ok(list.items.len())
    }

    async fn service_count(&self, namespace: &str) -> Result<usize, DomainError> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let list = services
            .list(&ListParams::default())
            .await
            .map_err(|e| backend_error("service_count", namespace, e))?;
        Ok(list.items.len())
    }

    async fn deployment_count(&self, namespace: &str) -> Result<usize, DomainError> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let list = deployments
            .list(&ListParams::default())
            .await
            .map_err(|e| backend_error("deployment_count", namespace, e))?;
        Ok(list.items.len())
    }

    async fn list_nodes(&self) -> Result<Vec<ClusterNode>, DomainError> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let list = nodes
            .list(&ListParams::default())
            .await
            .map_err(|e| backend_error("list_nodes", "nodes", e))?;
        debug!(nodes = list.items.len(), "Fetched nodes");
        Ok(list.items.into_iter().map(ClusterNode::from_k8s).collect())
    }

    async fn list_namespaces(&self) -> Result<Vec<ClusterNamespace>, DomainError> {
        let list = self
            .namespaces()
            .list(&ListParams::default())
            .await
            .map_err(|e| backend_error("list_namespaces", "namespaces", e))?;
        Ok(list.items.into_iter().map(ClusterNamespace::from_k8s).collect())
    }

    async fn server_version(&self) -> Result<String, DomainError> {
        let info = self
            .client
            .apiserver_version()
            .await
            .map_err(|e| backend_error("server_version", &self.endpoint, e))?;
        Ok(info.git_version)
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

/// Conversion from the k8s-openapi object into the snapshot the core works with.
trait FromK8s<T> {
    fn from_k8s(object: T) -> Self;
}

impl FromK8s<Node> for ClusterNode {
    fn from_k8s(node: Node) -> Self {
        let created_at = timestamp(node.metadata.creation_timestamp.as_ref());
        let status = node.status.unwrap_or_default();
        let taints = node.spec.and_then(|s| s.taints).unwrap_or_default();

        ClusterNode {
            name: node.metadata.name.unwrap_or_default(),
            labels: node.metadata.labels.unwrap_or_default(),
            conditions: status
                .conditions
                .unwrap_or_default()
                .into_iter()
                .map(|c| NodeCondition {
                    kind: c.type_,
                    status: c.status,
                })
                .collect(),
            kubelet_version: status
                .node_info
                .map(|info| info.kubelet_version)
                .unwrap_or_default(),
            capacity: resources(status.capacity),
            allocatable: resources(status.allocatable),
            taints: taints
                .into_iter()
                .map(|t| NodeTaint {
                    key: t.key,
                    value: t.value.unwrap_or_default(),
                    effect: t.effect,
                })
                .collect(),
            created_at,
        }
    }
}

impl FromK8s<Namespace> for ClusterNamespace {
    fn from_k8s(namespace: Namespace) -> Self {
        ClusterNamespace {
            created_at: timestamp(namespace.metadata.creation_timestamp.as_ref()),
            name: namespace.metadata.name.unwrap_or_default(),
            phase: namespace.status.and_then(|s| s.phase).unwrap_or_default(),
            labels: namespace.metadata.labels.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> KubeControlPlane {
        KubeControlPlane::from_settings(&ClusterSettings {
            name: "devplatform-dev".to_string(),
            api_server: server.uri(),
            token: Some("test-token".to_string()),
            token_file: None,
            ca_cert_file: None,
            accept_invalid_certs: false,
            timeout_secs: 5,
        })
        .await
        .unwrap()
    }

    fn list(kind: &str, items: Value) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": kind,
            "metadata": { "resourceVersion": "1" },
            "items": items
        })
    }

    #[test]
    fn test_kubeconfig_document_prefers_inline_token() {
        let settings = ClusterSettings {
            name: "devplatform-dev".to_string(),
            api_server: "https://10.0.0.1:6443/".to_string(),
            token: Some("inline".to_string()),
            token_file: Some("/var/run/token".to_string()),
            ca_cert_file: Some("/var/run/ca.crt".to_string()),
            accept_invalid_certs: false,
            timeout_secs: 5,
        };

        let doc = kubeconfig_document(&settings);
        assert_eq!(doc["clusters"][0]["cluster"]["server"], "https://10.0.0.1:6443");
        assert_eq!(doc["clusters"][0]["cluster"]["certificate-authority"], "/var/run/ca.crt");
        assert_eq!(doc["users"][0]["user"]["token"], "inline");
        assert!(doc["users"][0]["user"].get("tokenFile").is_none());
        assert_eq!(doc["current-context"], "devplatform-dev");

        let kubeconfig: Kubeconfig = serde_json::from_value(doc).unwrap();
        assert_eq!(kubeconfig.clusters.len(), 1);
    }

    #[tokio::test]
    async fn test_create_namespace_sends_labels_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/namespaces"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(json!({
                "metadata": {
                    "name": "tenant-acme-co",
                    "labels": { "created-by": "platform-api", "type": "tenant" }
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "apiVersion": "v1",
                "kind": "Namespace",
                "metadata": { "name": "tenant-acme-co" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let labels = BTreeMap::from([
            ("created-by".to_string(), "platform-api".to_string()),
            ("type".to_string(), "tenant".to_string()),
        ]);
        client(&server)
            .await
            .create_namespace("tenant-acme-co", &labels)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_api_error_becomes_backend_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/namespaces/tenant-acme-co"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "apiVersion": "v1",
                "kind": "Status",
                "status": "Failure",
                "message": "namespaces \"tenant-acme-co\" is forbidden",
                "reason": "Forbidden",
                "code": 403
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .delete_namespace("tenant-acme-co")
            .await
            .unwrap_err();
        match err {
            DomainError::BackendUnavailable { operation, target, message } => {
                assert_eq!(operation, "delete_namespace");
                assert_eq!(target, "tenant-acme-co");
                assert!(message.contains("forbidden"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_namespace_exists_maps_404_to_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/tenant-present"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiVersion": "v1",
                "kind": "Namespace",
                "metadata": { "name": "tenant-present" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/tenant-absent"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "apiVersion": "v1",
                "kind": "Status",
                "status": "Failure",
                "message": "namespaces \"tenant-absent\" not found",
                "reason": "NotFound",
                "code": 404
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/tenant-broken"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "apiVersion": "v1",
                "kind": "Status",
                "status": "Failure",
                "message": "etcdserver: request timed out",
                "reason": "InternalError",
                "code": 500
            })))
            .mount(&server)
            .await;

        let kube = client(&server).await;
        assert!(kube.namespace_exists("tenant-present").await.unwrap());
        assert!(!kube.namespace_exists("tenant-absent").await.unwrap());
        assert!(matches!(
            kube.namespace_exists("tenant-broken").await,
            Err(DomainError::BackendUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_counts_use_item_lists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/tenant-acme-co/pods"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list(
                "PodList",
                json!([{ "metadata": { "name": "a" } }, { "metadata": { "name": "b" } }]),
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/tenant-acme-co/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list(
                "ServiceList",
                json!([{ "metadata": { "name": "web" } }]),
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/apis/apps/v1/namespaces/tenant-acme-co/deployments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiVersion": "apps/v1",
                "kind": "DeploymentList",
                "metadata": { "resourceVersion": "1" },
                "items": []
            })))
            .mount(&server)
            .await;

        let kube = client(&server).await;
        assert_eq!(kube.pod_count("tenant-acme-co").await.unwrap(), 2);
        assert_eq!(kube.service_count("tenant-acme-co").await.unwrap(), 1);
        assert_eq!(kube.deployment_count("tenant-acme-co").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_nodes_decodes_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/nodes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list(
                "NodeList",
                json!([{
                    "metadata": {
                        "name": "ip-10-0-1-12",
                        "labels": {
                            "node.kubernetes.io/instance-type": "t3.large",
                            "topology.kubernetes.io/zone": "eu-west-2a"
                        },
                        "creationTimestamp": "2024-01-02T03:04:05Z"
                    },
                    "spec": {
                        "taints": [{ "key": "dedicated", "value": "infra", "effect": "NoSchedule" }]
                    },
                    "status": {
                        "conditions": [
                            { "type": "MemoryPressure", "status": "False" },
                            { "type": "Ready", "status": "True" }
                        ],
                        "nodeInfo": {
                            "architecture": "amd64",
                            "bootID": "",
                            "containerRuntimeVersion": "containerd://1.7.11",
                            "kernelVersion": "6.1.0",
                            "kubeProxyVersion": "v1.29.1-eks",
                            "kubeletVersion": "v1.29.1-eks",
                            "machineID": "",
                            "operatingSystem": "linux",
                            "osImage": "Amazon Linux 2023",
                            "systemUUID": ""
                        },
                        "capacity": { "cpu": "2", "memory": "8049960Ki", "pods": "35" },
                        "allocatable": { "cpu": "1930m", "memory": "7357736Ki" }
                    }
                }]),
            )))
            .mount(&server)
            .await;

        let nodes = client(&server).await.list_nodes().await.unwrap();
        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert_eq!(node.name, "ip-10-0-1-12");
        assert_eq!(node.ready(), Some(true));
        assert_eq!(node.kubelet_version, "v1.29.1-eks");
        assert_eq!(node.allocatable.as_ref().map(|r| r.cpu.as_str()), Some("1930m"));
        assert_eq!(node.taints[0].effect, "NoSchedule");
        assert_eq!(
            node.created_at.map(|t| t.to_rfc3339()),
            Some("2024-01-02T03:04:05+00:00".to_string())
        );
    }

    #[tokio::test]
    async fn test_list_namespaces_reads_phase() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list(
                "NamespaceList",
                json!([
                    {
                        "metadata": { "name": "tenant-acme-co", "labels": { "type": "tenant" } },
                        "status": { "phase": "Active" }
                    },
                    { "metadata": { "name": "kube-system" } }
                ]),
            )))
            .mount(&server)
            .await;

        let namespaces = client(&server).await.list_namespaces().await.unwrap();
        assert_eq!(namespaces.len(), 2);
        assert_eq!(namespaces[0].phase, "Active");
        assert_eq!(namespaces[0].labels.get("type").map(String::as_str), Some("tenant"));
        assert_eq!(namespaces[1].phase, "");
        assert!(namespaces[1].created_at.is_none());
    }

    #[tokio::test]
    async fn test_server_version_and_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "major": "1",
                "minor": "29",
                "gitVersion": "v1.29.1",
                "gitCommit": "bc401b91f2782410b3fb3f9acf43a995c4de90d2",
                "gitTreeState": "clean",
                "buildDate": "2024-01-17T13:38:41Z",
                "goVersion": "go1.21.6",
                "compiler": "gc",
                "platform": "linux/amd64"
            })))
            .mount(&server)
            .await;

        let kube = client(&server).await;
        assert_eq!(kube.server_version().await.unwrap(), "v1.29.1");
        assert_eq!(kube.endpoint(), server.uri());
    }
}
