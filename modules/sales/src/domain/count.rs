use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use docstore::DocumentStore;
use query_core::ast::Predicate;
use tracing::{debug, warn};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Exact,
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountEstimate {
    pub total: u64,
    pub precision: Precision,
}

impl CountEstimate {
    pub fn exact(total: u64) -> Self {
        Self {
            total,
            precision: Precision::Exact,
        }
    }

    pub fn estimated(total: u64) -> Self {
        Self {
            total,
            precision: Precision::Estimated,
        }
    }
}

const UNKNOWN: u64 = u64::MAX;

/// Counts matching records, trading precision for latency.
///
/// Unfiltered requests read the store's metadata count. Filtered requests get
/// an exact count under `budget`; when that fails the metadata count stands in,
/// and when that fails too the last metadata count seen is reused.
pub struct CountEstimator {
    store: Arc<dyn DocumentStore>,
    budget: Duration,
    last_known: AtomicU64,
}

impl CountEstimator {
    pub fn new(store: Arc<dyn DocumentStore>, budget: Duration) -> Self {
        Self {
            store,
            budget,
            last_known: AtomicU64::new(UNKNOWN),
        }
    }

    pub async fn estimate_total(&self, predicate: &Predicate) -> Result<CountEstimate, DomainError> {
        if predicate.is_universal() {
            return self.approximate().await;
        }

        match self.store.count(predicate, Some(self.budget)).await {
            Ok(total) => {
                debug!(total, "exact count");
                Ok(CountEstimate::exact(total))
            }
            Err(e) => {
                warn!(error = %e, "exact count failed; using the approximate total");
                self.approximate().await
            }
        }
    }

    /// Metadata count of the whole collection, or the last one seen.
    pub async fn approximate(&self) -> Result<CountEstimate, DomainError> {
        match self.store.estimated_count().await {
            Ok(total) => {
                self.last_known.store(total, Ordering::Relaxed);
                Ok(CountEstimate::estimated(total))
            }
            Err(e) => match self.last_known() {
                Some(total) => {
                    warn!(error = %e, total, "approximate count failed; reusing last known total");
                    Ok(CountEstimate::estimated(total))
                }
                None => Err(DomainError::store_unavailable(e.to_string())),
            },
        }
    }

    pub fn last_known(&self) -> Option<u64> {
        match self.last_known.load(Ordering::Relaxed) {
            UNKNOWN => None,
            n => Some(n),
        }
    }
}
