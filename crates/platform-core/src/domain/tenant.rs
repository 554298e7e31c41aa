// ============================================================================
// Platform Core - Tenant Entity
// File: crates/platform-core/src/domain/tenant.rs
// Description: Tenant record, creation request, and response view
// ============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use platform_shared::constants::{
    LABEL_CREATED_BY, LABEL_CREATED_BY_VALUE, LABEL_TENANT_ID, LABEL_TYPE, LABEL_TYPE_VALUE,
    NAMESPACE_PREFIX, NAMESPACE_SEPARATOR,
};

use super::lifecycle::{LifecycleEvent, LifecycleStep};
use super::resources::TenantResources;
use crate::error::DomainError;

/// Tenant status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Creating,
    Active,
    Failed,
    Deleting,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Creating => "creating",
            TenantStatus::Active => "active",
            TenantStatus::Failed => "failed",
            TenantStatus::Deleting => "deleting",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "creating" => Some(TenantStatus::Creating),
            "active" => Some(TenantStatus::Active),
            "failed" => Some(TenantStatus::Failed),
            "deleting" => Some(TenantStatus::Deleting),
            _ => None,
        }
    }
}

/// Derives the cluster namespace for a tenant name.
///
/// `"Acme Co"` and `"acme_co"` both map to `tenant-acme-co`.
pub fn namespace_for(name: &str) -> String {
    let normalized: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '_' {
                NAMESPACE_SEPARATOR
            } else {
                c
            }
        })
        .collect();
    format!("{}{}", NAMESPACE_PREFIX, normalized)
}

/// Create tenant payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner: String,
    pub email: String,
}

/// Tenant entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Tenant {
    pub id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Tenant name is required"))]
    pub name: String,

    pub namespace: String,

    pub description: String,

    #[validate(length(min = 1, max = 255, message = "Owner is required"))]
    pub owner: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    pub status: TenantStatus,
    pub lifecycle_step: LifecycleStep,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Builds a validated tenant ready for the catalog insert.
    pub fn provision(request: CreateTenantRequest) -> Result<Self, DomainError> {
        let name = request.name.trim().to_string();
        let step = LifecycleStep::Pending.apply(LifecycleEvent::CatalogWritten)?;
        let now = Utc::now();

        let tenant = Self {
            id: platform_shared::new_id(),
            namespace: namespace_for(&name),
            name,
            description: request.description.trim().to_string(),
            owner: request.owner.trim().to_string(),
            email: request.email.trim().to_string(),
            status: step.status(),
            lifecycle_step: step,
            created_at: now,
            updated_at: now,
        };

        tenant.validate()?;
        Ok(tenant)
    }

    pub fn set_step(&mut self, step: LifecycleStep) {
        self.lifecycle_step = step;
        self.status = step.status();
        self.updated_at = Utc::now();
    }

    /// Labels stamped on the tenant namespace.
    pub fn namespace_labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (LABEL_CREATED_BY.to_string(), LABEL_CREATED_BY_VALUE.to_string()),
            (LABEL_TYPE.to_string(), LABEL_TYPE_VALUE.to_string()),
            (LABEL_TENANT_ID.to_string(), self.id.to_string()),
        ])
    }
}

/// Tenant as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct TenantView {
    pub id: Uuid,
    pub name: String,
    pub namespace: String,
    pub description: String,
    pub owner: String,
    pub email: String,
    pub status: TenantStatus,
    pub lifecycle_step: LifecycleStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<TenantResources>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tenant> for TenantView {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
            namespace: tenant.namespace,
            description: tenant.description,
            owner: tenant.owner,
            email: tenant.email,
            status: tenant.status,
            lifecycle_step: tenant.lifecycle_step,
            resources: None,
            created_at: tenant.created_at,
            updated_at: tenant.updated_at,
        }
    }
}

impl TenantView {
    pub fn with_resources(mut self, resources: Option<TenantResources>) -> Self {
        self.resources = resources;
        self
    }
}
