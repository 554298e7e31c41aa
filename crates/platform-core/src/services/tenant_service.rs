// ============================================================================
// Platform Core - Tenant Lifecycle Service
// File: crates/platform-core/src/services/tenant_service.rs
// ============================================================================
//! Drives tenants through create/delete across the catalog and the cluster.
//!
//! Neither backend can roll the other back, so every step is written to the
//! catalog as a [`LifecycleStep`]. A failed cluster call leaves the row in
//! `failed` instead of deleting it, and deletion always releases the cluster
//! namespace before the row goes away.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use platform_shared::constants::{CPU_USAGE_PLACEHOLDER, MEMORY_USAGE_PLACEHOLDER};
use platform_shared::utils::mask_email;

use crate::clients::ClusterControlPlane;
use crate::domain::{
    CreateTenantRequest, LifecycleEvent, LifecycleStep, Tenant, TenantResources, TenantView,
};
use crate::error::DomainError;
use crate::repositories::CatalogStore;

/// Tenant lifecycle orchestrator
pub struct TenantService {
    catalog: Arc<dyn CatalogStore>,
    cluster: Arc<dyn ClusterControlPlane>,
}

/// Outcome of [`TenantService::recover_incomplete`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
    pub examined: usize,
    pub activated: usize,
    pub failed: usize,
    pub deleted: usize,
    pub errors: usize,
}

enum Settlement {
    Activated,
    Failed,
    Deleted,
}

impl TenantService {
    pub fn new(catalog: Arc<dyn CatalogStore>, cluster: Arc<dyn ClusterControlPlane>) -> Self {
        Self { catalog, cluster }
    }

    /// Create a tenant: catalog row first, then its namespace.
    pub async fn create_tenant(&self, request: CreateTenantRequest) -> Result<TenantView, DomainError> {
        // 1. Validate and derive namespace
        let mut tenant = Tenant::provision(request)?;
        info!(
            tenant_id = %tenant.id,
            namespace = %tenant.namespace,
            owner = %tenant.owner,
            email = %mask_email(&tenant.email),
            "Creating tenant"
        );

        // 2. Catalog write (status: creating)
        self.catalog.insert(&tenant).await?;

        // 3. Cluster namespace
        let labels = tenant.namespace_labels();
        match self.cluster.create_namespace(&tenant.namespace, &labels).await {
            Ok(()) => {
                // 4a. creating -> active
                self.advance(&mut tenant, LifecycleEvent::ClusterApplied).await?;
                self.advance(&mut tenant, LifecycleEvent::Settled).await?;
                info!(tenant_id = %tenant.id, namespace = %tenant.namespace, "Tenant active");
                Ok(TenantView::from(tenant))
            }
            Err(cluster_error) => {
                // 4b. creating -> failed; the row stays for operators
                error!(
                    tenant_id = %tenant.id,
                    namespace = %tenant.namespace,
                    "Namespace creation failed: {}",
                    cluster_error
                );
                for event in [LifecycleEvent::ClusterFailed, LifecycleEvent::Settled] {
                    if let Err(e) = self.advance(&mut tenant, event).await {
                        error!(tenant_id = %tenant.id, "Failed to record {} step: {}", event, e);
                        break;
                    }
                }
                Err(DomainError::PartialFailure {
                    tenant_id: tenant.id,
                    source: Box::new(cluster_error),
                })
            }
        }
    }

    /// Get a tenant, enriched with live resource counts when the cluster answers.
    pub async fn get_tenant(&self, id: &Uuid) -> Result<TenantView, DomainError> {
        let tenant = self.find(id).await?;

        let resources = match self.tenant_resources(&tenant).await {
            Ok(resources) => Some(resources),
            Err(e) => {
                warn!(tenant_id = %tenant.id, "Resource enrichment skipped: {}", e);
                None
            }
        };

        Ok(TenantView::from(tenant).with_resources(resources))
    }

    /// List tenants, newest first.
    pub async fn list_tenants(&self) -> Result<Vec<TenantView>, DomainError> {
        let tenants = self.catalog.list_all().await?;
        Ok(tenants.into_iter().map(TenantView::from).collect())
    }

    /// Delete a tenant: namespace first, catalog row last.
    pub async fn delete_tenant(&self, id: &Uuid) -> Result<(), DomainError> {
        // 1. Lookup
        let mut tenant = self.find(id).await?;
        info!(tenant_id = %tenant.id, namespace = %tenant.namespace, "Deleting tenant");

        // 2. Release the namespace unless an earlier attempt already did
        if tenant.lifecycle_step != LifecycleStep::ClusterReleased {
            self.cluster.delete_namespace(&tenant.namespace).await.map_err(|e| {
                error!(tenant_id = %tenant.id, "Namespace deletion failed: {}", e);
                e
            })?;

            // 3. Mark as deleting so a crash before step 4 stays visible
            if let Err(e) = self.advance(&mut tenant, LifecycleEvent::ClusterReleased).await {
                warn!(tenant_id = %tenant.id, "Failed to record cluster_released step: {}", e);
            }
        }

        // 4. Catalog row
        self.catalog.delete(&tenant.id).await?;
        info!(tenant_id = %tenant.id, "Tenant deleted");
        Ok(())
    }

    /// Settle tenants left mid-workflow by a previous process.
    pub async fn recover_incomplete(&self) -> Result<RecoveryReport, DomainError> {
        let tenants = self.catalog.list_all().await?;
        let mut report = RecoveryReport::default();

        for mut tenant in tenants
            .into_iter()
            .filter(|t| !t.lifecycle_step.is_settled())
        {
            report.examined += 1;
            match self.settle(&mut tenant).await {
                Ok(Settlement::Activated) => report.activated += 1,
                Ok(Settlement::Failed) => report.failed += 1,
                Ok(Settlement::Deleted) => report.deleted += 1,
                Err(e) => {
                    report.errors += 1;
                    error!(
                        tenant_id = %tenant.id,
                        step = %tenant.lifecycle_step,
                        "Could not settle tenant: {}",
                        e
                    );
                }
            }
        }

        info!(
            examined = report.examined,
            activated = report.activated,
            failed = report.failed,
            deleted = report.deleted,
            errors = report.errors,
            "Lifecycle recovery finished"
        );
        Ok(report)
    }

    async fn settle(&self, tenant: &mut Tenant) -> Result<Settlement, DomainError> {
        match tenant.lifecycle_step {
            LifecycleStep::Pending | LifecycleStep::CatalogWritten => {
                if tenant.lifecycle_step == LifecycleStep::Pending {
                    self.advance(tenant, LifecycleEvent::CatalogWritten).await?;
                }
                // The cluster call's outcome was never recorded; ask the cluster.
                let event = if self.cluster.namespace_exists(&tenant.namespace).await? {
                    LifecycleEvent::ClusterApplied
                } else {
                    LifecycleEvent::ClusterFailed
                };
                self.advance(tenant, event).await?;
                self.advance(tenant, LifecycleEvent::Settled).await?;
            }
            LifecycleStep::ClusterApplied | LifecycleStep::ClusterFailed => {
                self.advance(tenant, LifecycleEvent::Settled).await?;
            }
            LifecycleStep::ClusterReleased => {
                self.catalog.delete(&tenant.id).await?;
                info!(tenant_id = %tenant.id, "Completed interrupted deletion");
                return Ok(Settlement::Deleted);
            }
            LifecycleStep::Active | LifecycleStep::Failed => {}
        }

        info!(tenant_id = %tenant.id, step = %tenant.lifecycle_step, "Settled tenant");
        Ok(match tenant.lifecycle_step {
            LifecycleStep::Active => Settlement::Activated,
            _ => Settlement::Failed,
        })
    }

    /// Persist the next step, then mirror it on the in-memory record.
    async fn advance(&self, tenant: &mut Tenant, event: LifecycleEvent) -> Result<(), DomainError> {
        let next = tenant.lifecycle_step.apply(event)?;
        self.catalog.update_status(&tenant.id, next).await?;
        tenant.set_step(next);
        Ok(())
    }

    async fn find(&self, id: &Uuid) -> Result<Tenant, DomainError> {
        self.catalog
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::tenant_not_found(id))
    }

    async fn tenant_resources(&self, tenant: &Tenant) -> Result<TenantResources, DomainError> {
        let namespace = tenant.namespace.as_str();
        let (pods, services, deployments) = tokio::try_join!(
            self.cluster.pod_count(namespace),
            self.cluster.service_count(namespace),
            self.cluster.deployment_count(namespace),
        )?;

        Ok(TenantResources {
            tenant_id: tenant.id,
            namespace: tenant.namespace.clone(),
            pods,
            services,
            deployments,
            cpu_usage: CPU_USAGE_PLACEHOLDER.to_string(),
            memory_usage: MEMORY_USAGE_PLACEHOLDER.to_string(),
        })
    }
}
