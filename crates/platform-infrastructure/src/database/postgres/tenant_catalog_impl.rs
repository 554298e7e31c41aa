// ============================================================================
// Platform Infrastructure - PostgreSQL Tenant Catalog
// File: crates/platform-infrastructure/src/database/postgres/tenant_catalog_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info, warn};
use uuid::Uuid;

use platform_core::domain::{LifecycleStep, Tenant, TenantStatus};
use platform_core::error::DomainError;
use platform_core::repositories::CatalogStore;

const TABLE: &str = "tenants";

pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct TenantRow {
    pub id: Uuid,
    pub name: String,
    pub namespace: String,
    pub description: Option<String>,
    pub owner: String,
    pub email: String,
    pub status: String,
    pub lifecycle_step: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = String;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        let status = TenantStatus::from_str(&row.status)
            .ok_or_else(|| format!("unknown status '{}'", row.status))?;
        let lifecycle_step = LifecycleStep::from_str(&row.lifecycle_step)
            .ok_or_else(|| format!("unknown lifecycle step '{}'", row.lifecycle_step))?;

        Ok(Tenant {
            id: row.id,
            name: row.name,
            namespace: row.namespace,
            description: row.description.unwrap_or_default(),
            owner: row.owner,
            email: row.email,
            status,
            lifecycle_step,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn db_error(operation: &str, e: sqlx::Error) -> DomainError {
    error!("Database error during {}: {}", operation, e);
    DomainError::backend(operation, TABLE, e)
}

fn insert_error(tenant: &Tenant, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            let message = if constraint.contains("namespace") {
                format!("tenant namespace '{}' already exists", tenant.namespace)
            } else if constraint.contains("pkey") {
                format!("tenant id {} already exists", tenant.id)
            } else {
                format!("tenant name '{}' already exists", tenant.name)
            };
            warn!(tenant_id = %tenant.id, "{}", message);
            return DomainError::Conflict(message);
        }
    }
    db_error("insert_tenant", e)
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn insert(&self, tenant: &Tenant) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO tenants (
                id, name, namespace, description, owner, email,
                status, lifecycle_step, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.namespace)
        .bind(&tenant.description)
        .bind(&tenant.owner)
        .bind(&tenant.email)
        .bind(tenant.status.as_str())
        .bind(tenant.lifecycle_step.as_str())
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| insert_error(tenant, e))?;

        info!(tenant_id = %tenant.id, "Tenant row inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, namespace, description, owner, email,
                status, lifecycle_step, created_at, updated_at
            FROM tenants
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("find_tenant", e))?;

        row.map(Tenant::try_from)
            .transpose()
            .map_err(|e| DomainError::Internal(format!("tenant {} is unreadable: {}", id, e)))
    }

    async fn list_all(&self) -> Result<Vec<Tenant>, DomainError> {
        let rows: Vec<TenantRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, namespace, description, owner, email,
                status, lifecycle_step, created_at, updated_at
            FROM tenants
            ORDER BY created_at DESC
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("list_tenants", e))?;

        Ok(decode_rows(rows))
    }

    async fn update_status(&self, id: &Uuid, step: LifecycleStep) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET status = $2, lifecycle_step = $3, updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(step.status().as_str())
        .bind(step.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("update_tenant_status", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::tenant_not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("delete_tenant", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::tenant_not_found(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("ping", e))?;
        Ok(())
    }
}

/// Rows that fail to decode are dropped from listings.
fn decode_rows(rows: Vec<TenantRow>) -> Vec<Tenant> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match Tenant::try_from(row) {
                Ok(tenant) => Some(tenant),
                Err(e) => {
                    warn!(tenant_id = %id, "Skipping unreadable tenant row: {}", e);
                    None
                }
            }
        })
        .collect()
}
