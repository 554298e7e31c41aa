//! Domain errors

use std::fmt::Display;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::{LifecycleEvent, LifecycleStep};

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{operation} failed for {target}: {message}")]
    BackendUnavailable {
        operation: String,
        target: String,
        message: String,
    },

    /// The catalog row exists (status `failed`) but the cluster side never came up.
    #[error("Tenant {tenant_id} was recorded but not provisioned: {source}")]
    PartialFailure {
        tenant_id: Uuid,
        #[source]
        source: Box<DomainError>,
    },

    #[error("Illegal lifecycle transition from {from} on {event}")]
    IllegalTransition {
        from: LifecycleStep,
        event: LifecycleEvent,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    BackendUnavailable,
    Internal,
}

impl DomainError {
    pub fn backend(operation: &str, target: impl Display, message: impl Display) -> Self {
        DomainError::BackendUnavailable {
            operation: operation.to_string(),
            target: target.to_string(),
            message: message.to_string(),
        }
    }

    pub fn tenant_not_found(id: &Uuid) -> Self {
        DomainError::NotFound(format!("tenant {}", id))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::BackendUnavailable { .. } | DomainError::PartialFailure { .. } => {
                ErrorKind::BackendUnavailable
            }
            DomainError::IllegalTransition { .. } | DomainError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        DomainError::Validation(messages.join("; "))
    }
}
