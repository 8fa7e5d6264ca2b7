use docstore::StoreError;
use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Query timed out: {operation}")]
    QueryTimeout { operation: String },

    /// The store rejected the query itself (bad pipeline, sort limits).
    #[error("Query rejected: {message}")]
    InvalidQuery { message: String },
}

impl DomainError {
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn query_timeout(operation: impl Into<String>) -> Self {
        Self::QueryTimeout {
            operation: operation.into(),
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Timeout { operation, .. } => Self::query_timeout(operation),
            StoreError::Unavailable(message) | StoreError::Load(message) => {
                Self::store_unavailable(message)
            }
            StoreError::SortMemoryLimit { .. } | StoreError::InvalidQuery(_) => {
                Self::invalid_query(e.to_string())
            }
        }
    }
}
