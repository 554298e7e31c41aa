//! # Platform Core - Domain Module
//! 
//! Tenant records, lifecycle steps, and the ephemeral read models assembled
//! from cluster and billing queries.

pub mod tenant;
pub mod lifecycle;
pub mod resources;
pub mod cost;
pub mod cluster;

// Re-export all entities and enums
pub use tenant::{namespace_for, CreateTenantRequest, Tenant, TenantStatus, TenantView};
pub use lifecycle::{LifecycleEvent, LifecycleStep};
pub use resources::TenantResources;
pub use cost::{
    BillingQuery, CostBreakdown, CostDatum, CostGroup, CostQuery, CostRequest, CostWindow,
    Granularity, GroupDimension, PlatformCostOverview, TagFilter, TenantCostSummary,
};
pub use cluster::{
    ClusterMetrics, ClusterNamespace, ClusterNode, ClusterOverview, ClusterStatus, NamespaceInfo,
    NodeCondition, NodeInfo, NodeResources, NodeTaint, ReadinessState, ResourceUsage, TaintInfo,
};
