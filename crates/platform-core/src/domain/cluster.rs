// ============================================================================
// Platform Core - Cluster Snapshots
// File: crates/platform-core/src/domain/cluster.rs
// Description: Raw control-plane objects and the views derived from them
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

const LABEL_CONTROL_PLANE: &str = "node-role.kubernetes.io/control-plane";
const LABEL_MASTER: &str = "node-role.kubernetes.io/master";
const LABEL_ROLE: &str = "kubernetes.io/role";
const LABEL_INSTANCE_TYPE: &str = "node.kubernetes.io/instance-type";
const LABEL_ZONE: &str = "topology.kubernetes.io/zone";
const CONDITION_READY: &str = "Ready";
const CONDITION_TRUE: &str = "True";

// ---------------------------------------------------------------------------
// Control-plane objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeCondition {
    pub kind: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeResources {
    pub cpu: String,
    pub memory: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTaint {
    pub key: String,
    pub value: String,
    pub effect: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterNode {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub conditions: Vec<NodeCondition>,
    pub kubelet_version: String,
    pub capacity: Option<NodeResources>,
    pub allocatable: Option<NodeResources>,
    pub taints: Vec<NodeTaint>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ClusterNode {
    /// Status of the node's `Ready` condition, `None` when the node reports none.
    pub fn ready(&self) -> Option<bool> {
        self.conditions
            .iter()
            .find(|c| c.kind == CONDITION_READY)
            .map(|c| c.status == CONDITION_TRUE)
    }

    /// Role by label precedence: control-plane, master, explicit role, worker.
    pub fn role(&self) -> String {
        if self.labels.contains_key(LABEL_CONTROL_PLANE) {
            return "control-plane".to_string();
        }
        if self.labels.contains_key(LABEL_MASTER) {
            return "master".to_string();
        }
        if let Some(role) = self.labels.get(LABEL_ROLE) {
            return role.clone();
        }
        "worker".to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterNamespace {
    pub name: String,
    pub phase: String,
    pub labels: BTreeMap<String, String>,
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadinessState {
    Ready,
    NotReady,
}

impl ReadinessState {
    /// `NotReady` as soon as one node reports a non-true `Ready` condition.
    pub fn of_nodes(nodes: &[ClusterNode]) -> Self {
        if nodes.iter().any(|n| n.ready() == Some(false)) {
            ReadinessState::NotReady
        } else {
            ReadinessState::Ready
        }
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessState::Ready => f.write_str("Ready"),
            ReadinessState::NotReady => f.write_str("NotReady"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterStatus {
    pub name: String,
    pub status: ReadinessState,
    pub version: String,
    pub endpoint: String,
    pub node_count: usize,
    pub last_update: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceUsage {
    pub capacity: String,
    pub allocatable: String,
    pub used: String,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaintInfo {
    pub key: String,
    pub value: String,
    pub effect: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub name: String,
    pub status: ReadinessState,
    pub role: String,
    pub version: String,
    pub instance_type: String,
    pub zone: String,
    pub cpu: ResourceUsage,
    pub memory: ResourceUsage,
    pub labels: BTreeMap<String, String>,
    pub taints: Vec<TaintInfo>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&ClusterNode> for NodeInfo {
    fn from(node: &ClusterNode) -> Self {
        let status = match node.ready() {
            Some(false) => ReadinessState::NotReady,
            _ => ReadinessState::Ready,
        };

        let (cpu, memory) = match &node.capacity {
            Some(capacity) => {
                let allocatable = node.allocatable.clone().unwrap_or_default();
                (
                    usage(&capacity.cpu, &allocatable.cpu),
                    usage(&capacity.memory, &allocatable.memory),
                )
            }
            None => (ResourceUsage::default(), ResourceUsage::default()),
        };

        Self {
            name: node.name.clone(),
            status,
            role: node.role(),
            version: node.kubelet_version.clone(),
            instance_type: node.labels.get(LABEL_INSTANCE_TYPE).cloned().unwrap_or_default(),
            zone: node.labels.get(LABEL_ZONE).cloned().unwrap_or_default(),
            cpu,
            memory,
            labels: node.labels.clone(),
            taints: node
                .taints
                .iter()
                .map(|t| TaintInfo {
                    key: t.key.clone(),
                    value: t.value.clone(),
                    effect: t.effect.clone(),
                })
                .collect(),
            created_at: node.created_at,
        }
    }
}

// No metrics API is consulted, so usage stays at zero.
fn usage(capacity: &str, allocatable: &str) -> ResourceUsage {
    ResourceUsage {
        capacity: capacity.to_string(),
        allocatable: allocatable.to_string(),
        used: "0".to_string(),
        percentage: 0,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NamespaceInfo {
    pub name: String,
    pub status: String,
    pub labels: BTreeMap<String, String>,
    pub pod_count: usize,
    pub created_at: Option<DateTime<Utc>>,
}

/// Only `total_pods` is derived today; the remaining fields keep zero values.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterMetrics {
    pub total_pods: usize,
    pub running_pods: usize,
    pub pending_pods: usize,
    pub failed_pods: usize,
    pub total_cpu: String,
    pub total_memory: String,
    pub used_cpu: String,
    pub used_memory: String,
    pub cpu_percentage: u32,
    pub memory_percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterOverview {
    pub cluster: ClusterStatus,
    pub nodes: Vec<NodeInfo>,
    pub namespaces: Vec<NamespaceInfo>,
    pub metrics: ClusterMetrics,
}
