//! Cluster control-plane client trait (port)

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{ClusterNamespace, ClusterNode};
use crate::error::DomainError;

/// Namespace lifecycle and read access to one cluster.
///
/// Each call is a single round trip; implementations do not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterControlPlane: Send + Sync {
    async fn create_namespace(
        &self,
        name: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<(), DomainError>;
    async fn delete_namespace(&self, name: &str) -> Result<(), DomainError>;
    async fn namespace_exists(&self, name: &str) -> Result<bool, DomainError>;
    async fn pod_count(&self, namespace: &str) -> Result<usize, DomainError>;
    async fn service_count(&self, namespace: &str) -> Result<usize, DomainError>;
    async fn deployment_count(&self, namespace: &str) -> Result<usize, DomainError>;
    async fn list_nodes(&self) -> Result<Vec<ClusterNode>, DomainError>;
    async fn list_namespaces(&self) -> Result<Vec<ClusterNamespace>, DomainError>;
    async fn server_version(&self) -> Result<String, DomainError>;
    /// API server address, reported in cluster status.
    fn endpoint(&self) -> String;
}
