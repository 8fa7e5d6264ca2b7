//! Query-capable document store port and its in-memory backend.
//!
//! The [`DocumentStore`] trait is what the domain consumes: predicate finds with
//! sort/skip/limit/time-budget/disk-spill options, exact and approximate counts,
//! multi-stage aggregation and per-field distinct enumeration.
//! [`MemoryStore`] evaluates `query_core` predicates over an immutable dataset.

use std::time::Duration;

use async_trait::async_trait;
use query_core::{ast::Predicate, AggregateOptions, Document, FindOptions, Stage, Value};
use thiserror::Error;

mod aggregate;
pub mod eval;
pub mod loader;
mod memory;

pub use loader::{load_documents, DatasetFormat};
pub use memory::{MemoryStore, MemoryStoreOptions};

#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("{operation} exceeded its time budget of {budget:?}")]
    Timeout {
        operation: &'static str,
        budget: Duration,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("sort over {rows} documents exceeds the in-memory limit of {limit}; allow disk use to proceed")]
    SortMemoryLimit { rows: usize, limit: usize },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("failed to load dataset: {0}")]
    Load(String),
}

impl StoreError {
    pub fn timeout(operation: &'static str, budget: Duration) -> Self {
        Self::Timeout { operation, budget }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Port for a read-only, query-capable document collection.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents matching `filter`, shaped by `opts`.
    async fn find(&self, filter: &Predicate, opts: &FindOptions) -> StoreResult<Vec<Document>>;

    /// Exact number of documents matching `filter`.
    async fn count(&self, filter: &Predicate, max_time: Option<Duration>) -> StoreResult<u64>;

    /// Cheap total taken from collection metadata; never scans.
    async fn estimated_count(&self) -> StoreResult<u64>;

    async fn aggregate(
        &self,
        pipeline: &[Stage],
        opts: &AggregateOptions,
    ) -> StoreResult<Vec<Document>>;

    /// Distinct values of `field` among documents matching `filter`.
    async fn distinct(
        &self,
        field: &str,
        filter: &Predicate,
        max_time: Option<Duration>,
    ) -> StoreResult<Vec<Value>>;
}
