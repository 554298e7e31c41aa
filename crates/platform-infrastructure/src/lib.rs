//! # Platform Infrastructure
//! 
//! Adapters for the platform ports: PostgreSQL catalog, Kubernetes
//! control plane, and AWS Cost Explorer billing.

pub mod database;
pub mod cluster;
pub mod billing;

pub use database::{create_pool, run_migrations, PgCatalogStore};
pub use cluster::KubeControlPlane;
pub use billing::CostExplorerBilling;
