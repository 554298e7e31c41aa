//! HTTP handlers

pub mod health;
pub mod tenants;
pub mod costs;
pub mod clusters;

use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use uuid::Uuid;

use crate::error::ApiError;

/// Tenant id from the path; anything that is not a UUID is a 400.
pub(crate) fn tenant_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest("Invalid tenant ID".to_string()))
}
