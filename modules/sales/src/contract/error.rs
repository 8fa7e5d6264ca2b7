use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SalesError {
    #[error("Sales data is temporarily unavailable")]
    Unavailable,

    #[error("Internal error")]
    Internal,
}

impl SalesError {
    pub fn unavailable() -> Self {
        Self::Unavailable
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for SalesError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            StoreUnavailable { .. } | QueryTimeout { .. } => Self::unavailable(),
            InvalidQuery { .. } => Self::internal(),
        }
    }
}
