//! Domain services (business logic)

pub mod tenant_service;
pub mod cost_service;
pub mod cluster_service;

pub use tenant_service::{RecoveryReport, TenantService};
pub use cost_service::{CostService, CostTags};
pub use cluster_service::ClusterService;
