// ============================================================================
// Platform Core - Tenant Lifecycle Steps
// File: crates/platform-core/src/domain/lifecycle.rs
// Description: Persisted saga position for create/delete workflows
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use super::tenant::TenantStatus;
use crate::error::DomainError;

/// Saga position of a tenant, persisted next to its status.
///
/// ```text
/// pending -> catalog_written -> cluster_applied -> active
///                           \-> cluster_failed  -> failed
/// (any persisted step)      -> cluster_released  (row deleted next)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStep {
    Pending,
    CatalogWritten,
    ClusterApplied,
    ClusterFailed,
    Active,
    Failed,
    ClusterReleased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    CatalogWritten,
    ClusterApplied,
    ClusterFailed,
    Settled,
    ClusterReleased,
}

impl LifecycleStep {
    pub fn apply(self, event: LifecycleEvent) -> Result<LifecycleStep, DomainError> {
        use LifecycleEvent as E;
        use LifecycleStep as S;

        let next = match (self, event) {
            (S::Pending, E::CatalogWritten) => S::CatalogWritten,
            (S::CatalogWritten, E::ClusterApplied) => S::ClusterApplied,
            (S::CatalogWritten, E::ClusterFailed) => S::ClusterFailed,
            (S::ClusterApplied, E::Settled) => S::Active,
            (S::ClusterFailed, E::Settled) => S::Failed,
            (
                S::CatalogWritten | S::ClusterApplied | S::ClusterFailed | S::Active | S::Failed,
                E::ClusterReleased,
            ) => S::ClusterReleased,
            (from, event) => return Err(DomainError::IllegalTransition { from, event }),
        };
        Ok(next)
    }

    /// Externally visible status for this step.
    pub fn status(self) -> TenantStatus {
        match self {
            LifecycleStep::Pending | LifecycleStep::CatalogWritten | LifecycleStep::ClusterApplied => {
                TenantStatus::Creating
            }
            LifecycleStep::Active => TenantStatus::Active,
            LifecycleStep::ClusterFailed | LifecycleStep::Failed => TenantStatus::Failed,
            LifecycleStep::ClusterReleased => TenantStatus::Deleting,
        }
    }

    /// Settled steps need no recovery.
    pub fn is_settled(self) -> bool {
        matches!(self, LifecycleStep::Active | LifecycleStep::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStep::Pending => "pending",
            LifecycleStep::CatalogWritten => "catalog_written",
            LifecycleStep::ClusterApplied => "cluster_applied",
            LifecycleStep::ClusterFailed => "cluster_failed",
            LifecycleStep::Active => "active",
            LifecycleStep::Failed => "failed",
            LifecycleStep::ClusterReleased => "cluster_released",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(LifecycleStep::Pending),
            "catalog_written" => Some(LifecycleStep::CatalogWritten),
            "cluster_applied" => Some(LifecycleStep::ClusterApplied),
            "cluster_failed" => Some(LifecycleStep::ClusterFailed),
            "active" => Some(LifecycleStep::Active),
            "failed" => Some(LifecycleStep::Failed),
            "cluster_released" => Some(LifecycleStep::ClusterReleased),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::CatalogWritten => "catalog_written",
            LifecycleEvent::ClusterApplied => "cluster_applied",
            LifecycleEvent::ClusterFailed => "cluster_failed",
            LifecycleEvent::Settled => "settled",
            LifecycleEvent::ClusterReleased => "cluster_released",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
