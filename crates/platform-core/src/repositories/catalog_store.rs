//! Tenant catalog trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{LifecycleStep, Tenant};
use crate::error::DomainError;

/// Durable tenant records.
///
/// `insert` reports a name or namespace collision as `Conflict`; `delete` of an
/// unknown id is `NotFound`. Every other failure is `BackendUnavailable`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, tenant: &Tenant) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError>;
    /// Newest first. Rows that cannot be decoded are left out.
    async fn list_all(&self) -> Result<Vec<Tenant>, DomainError>;
    /// Persists `step` together with the status it implies.
    async fn update_status(&self, id: &Uuid, step: LifecycleStep) -> Result<(), DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}
