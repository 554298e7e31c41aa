//! PostgreSQL repository implementations

pub mod tenant_catalog_impl;

pub use tenant_catalog_impl::PgCatalogStore;
