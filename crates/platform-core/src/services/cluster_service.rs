// ============================================================================
// Platform Core - Cluster Read Service
// File: crates/platform-core/src/services/cluster_service.rs
// ============================================================================
//! Read-only cluster views. The control-plane client is bound to a single
//! cluster, so `cluster_name` is echoed back rather than used for routing.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::clients::ClusterControlPlane;
use crate::domain::{
    ClusterMetrics, ClusterNamespace, ClusterOverview, ClusterStatus, NamespaceInfo, NodeInfo,
    ReadinessState,
};
use crate::error::DomainError;

pub struct ClusterService {
    cluster: Arc<dyn ClusterControlPlane>,
}

impl ClusterService {
    pub fn new(cluster: Arc<dyn ClusterControlPlane>) -> Self {
        Self { cluster }
    }

    pub async fn get_cluster_status(&self, cluster_name: &str) -> Result<ClusterStatus, DomainError> {
        let version = self.cluster.server_version().await?;
        let nodes = self.cluster.list_nodes().await?;

        Ok(ClusterStatus {
            name: cluster_name.to_string(),
            status: ReadinessState::of_nodes(&nodes),
            version,
            endpoint: self.cluster.endpoint(),
            node_count: nodes.len(),
            last_update: Utc::now(),
        })
    }

    pub async fn get_cluster_nodes(&self, cluster_name: &str) -> Result<Vec<NodeInfo>, DomainError> {
        let nodes = self.cluster.list_nodes().await?;
        debug!(cluster = cluster_name, nodes = nodes.len(), "Listed cluster nodes");
        Ok(nodes.iter().map(NodeInfo::from).collect())
    }

    /// Namespaces with their pod counts; a failed count reports 0.
    pub async fn get_cluster_namespaces(
        &self,
        cluster_name: &str,
    ) -> Result<Vec<NamespaceInfo>, DomainError> {
        let namespaces = self.cluster.list_namespaces().await?;
        debug!(cluster = cluster_name, namespaces = namespaces.len(), "Listed cluster namespaces");

        let mut infos = Vec::with_capacity(namespaces.len());
        for namespace in namespaces {
            let pod_count = match self.cluster.pod_count(&namespace.name).await {
                Ok(count) => count,
                Err(e) => {
                    warn!(namespace = %namespace.name, "Pod count unavailable: {}", e);
                    0
                }
            };
            infos.push(namespace_info(namespace, pod_count));
        }
        Ok(infos)
    }

    pub async fn get_cluster_overview(
        &self,
        cluster_name: &str,
    ) -> Result<ClusterOverview, DomainError> {
        let cluster = self.get_cluster_status(cluster_name).await?;
        let nodes = self.get_cluster_nodes(cluster_name).await?;
        let namespaces = self.get_cluster_namespaces(cluster_name).await?;

        let metrics = ClusterMetrics {
            total_pods: namespaces.iter().map(|ns| ns.pod_count).sum(),
            ..ClusterMetrics::default()
        };

        Ok(ClusterOverview {
            cluster,
            nodes,
            namespaces,
            metrics,
        })
    }
}

fn namespace_info(namespace: ClusterNamespace, pod_count: usize) -> NamespaceInfo {
    NamespaceInfo {
        name: namespace.name,
        status: namespace.phase,
        labels: namespace.labels,
        pod_count,
        created_at: namespace.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockClusterControlPlane;
    use crate::domain::{ClusterNode, NodeCondition};

    fn node(name: &str, ready: &str) -> ClusterNode {
        ClusterNode {
            name: name.to_string(),
            conditions: vec![NodeCondition {
                kind: "Ready".to_string(),
                status: ready.to_string(),
            }],
            kubelet_version: "v1.29.1".to_string(),
            ..ClusterNode::default()
        }
    }

    fn namespace(name: &str) -> ClusterNamespace {
        ClusterNamespace {
            name: name.to_string(),
            phase: "Active".to_string(),
            ..ClusterNamespace::default()
        }
    }

    #[tokio::test]
    async fn test_status_not_ready_when_any_node_is_not_ready() {
        let mut cluster = MockClusterControlPlane::new();
        cluster
            .expect_server_version()
            .returning(|| Ok("v1.29.1".to_string()));
        cluster
            .expect_list_nodes()
            .returning(|| Ok(vec![node("a", "True"), node("b", "Unknown")]));
        cluster
            .expect_endpoint()
            .return_const("https://cluster.internal".to_string());

        let status = ClusterService::new(Arc::new(cluster))
            .get_cluster_status("devplatform-dev")
            .await
            .unwrap();

        assert_eq!(status.name, "devplatform-dev");
        assert_eq!(status.status, ReadinessState::NotReady);
        assert_eq!(status.node_count, 2);
        assert_eq!(status.version, "v1.29.1");
        assert_eq!(status.endpoint, "https://cluster.internal");
    }

    #[tokio::test]
    async fn test_status_propagates_backend_error() {
        let mut cluster = MockClusterControlPlane::new();
        cluster
            .expect_server_version()
            .returning(|| Err(DomainError::backend("server_version", "/version", "refused")));

        let result = ClusterService::new(Arc::new(cluster))
            .get_cluster_status("devplatform-dev")
            .await;
        assert!(matches!(result, Err(DomainError::BackendUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_namespaces_default_pod_count_on_error() {
        let mut cluster = MockClusterControlPlane::new();
        cluster
            .expect_list_namespaces()
            .returning(|| Ok(vec![namespace("default"), namespace("tenant-acme-co")]));
        cluster.expect_pod_count().returning(|ns| {
            if ns == "default" {
                Ok(3)
            } else {
                Err(DomainError::backend("pod_count", ns, "forbidden"))
            }
        });

        let infos = ClusterService::new(Arc::new(cluster))
            .get_cluster_namespaces("devplatform-dev")
            .await
            .unwrap();
        let counts: Vec<(String, usize)> = infos.into_iter().map(|i| (i.name, i.pod_count)).collect();
        assert_eq!(
            counts,
            vec![("default".to_string(), 3), ("tenant-acme-co".to_string(), 0)]
        );
    }

    #[tokio::test]
    async fn test_overview_sums_pods() {
        let mut cluster = MockClusterControlPlane::new();
        cluster
            .expect_server_version()
            .returning(|| Ok("v1.29.1".to_string()));
        cluster
            .expect_list_nodes()
            .returning(|| Ok(vec![node("a", "True")]));
        cluster.expect_endpoint().return_const(String::new());
        cluster
            .expect_list_namespaces()
            .returning(|| Ok(vec![namespace("default"), namespace("kube-system")]));
        cluster.expect_pod_count().returning(|_| Ok(2));

        let overview = ClusterService::new(Arc::new(cluster))
            .get_cluster_overview("devplatform-dev")
            .await
            .unwrap();

        assert_eq!(overview.cluster.status, ReadinessState::Ready);
        assert_eq!(overview.nodes.len(), 1);
        assert_eq!(overview.nodes[0].role, "worker");
        assert_eq!(overview.metrics.total_pods, 4);
        assert_eq!(overview.metrics.running_pods, 0);
    }
}
