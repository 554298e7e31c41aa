//! Tenant resource snapshot

use serde::Serialize;
use uuid::Uuid;

/// Point-in-time workload counts for a tenant namespace. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantResources {
    pub tenant_id: Uuid,
    pub namespace: String,
    pub pods: usize,
    pub services: usize,
    pub deployments: usize,
    pub cpu_usage: String,
    pub memory_usage: String,
}
