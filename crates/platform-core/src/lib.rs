//! # Platform Core
//! 
//! Tenant domain, lifecycle orchestration, read-side aggregation, and the
//! ports (catalog, cluster, billing) the services are built against.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod clients;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, ErrorKind};
