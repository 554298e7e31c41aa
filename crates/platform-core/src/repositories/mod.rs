//! Repository traits (ports)

pub mod catalog_store;
pub mod memory;

pub use catalog_store::CatalogStore;
pub use memory::InMemoryCatalogStore;

#[cfg(test)]
pub use catalog_store::MockCatalogStore;
