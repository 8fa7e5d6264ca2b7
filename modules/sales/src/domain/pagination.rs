//! Offset pagination over a large collection.
//!
//! Skipping is linear in the offset, so deep pages switch strategy:
//!
//! * [`Strategy::Direct`]: find with sort/skip/limit on the requested column.
//! * [`Strategy::AnchorRange`]: locate the identifier just before the window
//!   with an identifier-only scan, then range-scan past it.
//! * [`Strategy::AggregatedWindow`]: a single match/sort/skip/limit/project
//!   pipeline with disk spill allowed.
//!
//! The last two always order by the transaction identifier; the requested
//! sort column only applies to shallow pages.

use std::sync::Arc;
use std::time::Duration;

use docstore::DocumentStore;
use query_core::ast::{Condition, Predicate};
use query_core::{AggregateOptions, Document, FindOptions, Ordering, SortDir, Stage, Value};
use tracing::{debug, info, warn};

use crate::contract::model::{
    PageRequest, PaginationMeta, PaginationPath, RangePage, RangeRequest, SaleRecord, SalesPage,
    SortOrder,
};
use crate::domain::count::CountEstimator;
use crate::domain::error::DomainError;
use crate::domain::fields::{self, TRANSACTION_ID};
use crate::domain::projector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    AnchorRange,
    AggregatedWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub direct_offset_limit: u64,
    pub anchor_offset_limit: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            direct_offset_limit: 100_000,
            anchor_offset_limit: 500_000,
        }
    }
}

/// Time budgets handed to the store, per kind of call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budgets {
    pub count: Duration,
    pub page: Duration,
    pub window: Duration,
    pub range: Duration,
    pub anchor: Duration,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            count: Duration::from_secs(15),
            page: Duration::from_secs(60),
            window: Duration::from_secs(90),
            range: Duration::from_secs(30),
            anchor: Duration::from_secs(30),
        }
    }
}

pub fn choose_strategy(offset: u64, path: PaginationPath, t: &Thresholds) -> Strategy {
    if offset <= t.direct_offset_limit {
        return Strategy::Direct;
    }
    match path {
        PaginationPath::Standard if offset <= t.anchor_offset_limit => Strategy::AnchorRange,
        _ => Strategy::AggregatedWindow,
    }
}

pub fn sort_dir(order: SortOrder) -> SortDir {
    match order {
        SortOrder::Asc => SortDir::Asc,
        SortOrder::Desc => SortDir::Desc,
    }
}

/// One window of a result: `page_size` records starting at `offset`.
#[derive(Debug, Clone)]
pub struct Window<'a> {
    pub predicate: &'a Predicate,
    pub sort_field: &'a str,
    pub dir: SortDir,
    pub offset: u64,
    pub page_size: u64,
}

/// Runs page and range queries against the store.
pub struct PaginationStrategist {
    store: Arc<dyn DocumentStore>,
    counter: CountEstimator,
    thresholds: Thresholds,
    budgets: Budgets,
}

impl PaginationStrategist {
    pub fn new(store: Arc<dyn DocumentStore>, thresholds: Thresholds, budgets: Budgets) -> Self {
        Self {
            counter: CountEstimator::new(store.clone(), budgets.count),
            store,
            thresholds,
            budgets,
        }
    }

    pub fn counter(&self) -> &CountEstimator {
        &self.counter
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub async fn get_page(
        &self,
        predicate: &Predicate,
        request: &PageRequest,
    ) -> Result<SalesPage, DomainError> {
        let page_size = request.page_size.max(1);
        let requested = request.page.max(1);

        let estimate = self.counter.estimate_total(predicate).await?;
        let meta = PaginationMeta::new(requested, page_size, estimate.total);
        debug!(
            total = estimate.total,
            precision = ?estimate.precision,
            total_pages = meta.total_pages,
            "counted matching records"
        );

        if requested > meta.total_pages {
            debug!(requested, last = meta.total_pages, "page beyond the end");
            return Ok(SalesPage {
                records: Vec::new(),
                pagination: meta,
            });
        }

        let offset = (requested - 1).saturating_mul(page_size);
        let strategy = choose_strategy(offset, request.path, &self.thresholds);
        let window = Window {
            predicate,
            sort_field: fields::sort_field(request.sort_key),
            dir: sort_dir(request.sort_order),
            offset,
            page_size,
        };
        info!(?strategy, offset, page_size, "fetching page");

        let mut records = self.fetch(strategy, &window).await?;

        if records.is_empty() && estimate.total > 0 && requested < meta.total_pages {
            warn!(?strategy, offset, "empty page inside the result; retrying with a plain scan");
            let retry = Window {
                sort_field: TRANSACTION_ID,
                dir: SortDir::Asc,
                ..window
            };
            records = self.direct(&retry).await?;
        }

        Ok(SalesPage {
            records,
            pagination: meta,
        })
    }

    pub async fn get_range(
        &self,
        predicate: &Predicate,
        request: &RangeRequest,
    ) -> Result<RangePage, DomainError> {
        let dir = sort_dir(request.sort_order);
        let predicate = match request.last_id {
            Some(last) => predicate.clone().and(beyond(dir, Value::from(last))),
            None => predicate.clone(),
        };

        let opts = FindOptions::new()
            .sort(Ordering::by(TRANSACTION_ID, dir))
            .limit(request.page_size.max(1))
            .max_time(self.budgets.range)
            .allow_disk_use(true);
        let docs = self.store.find(&predicate, &opts).await?;
        let records: Vec<SaleRecord> = docs.iter().map(projector::project).collect();

        let total_records = self.counter.approximate().await?.total;
        let last_id = records.last().and_then(|r| r.id);
        Ok(RangePage {
            records,
            total_records,
            last_id,
        })
    }

    /// Records of `window` fetched the way `strategy` prescribes.
    pub async fn fetch(
        &self,
        strategy: Strategy,
        window: &Window<'_>,
    ) -> Result<Vec<SaleRecord>, DomainError> {
        match strategy {
            Strategy::Direct => self.direct(window).await,
            Strategy::AnchorRange => self.anchor_range(window).await,
            Strategy::AggregatedWindow => self.aggregated_window(window).await,
        }
    }

    async fn direct(&self, w: &Window<'_>) -> Result<Vec<SaleRecord>, DomainError> {
        let opts = FindOptions::new()
            .sort(Ordering::by(w.sort_field, w.dir).ensure_tiebreaker(TRANSACTION_ID, w.dir))
            .skip(w.offset)
            .limit(w.page_size)
            .max_time(self.budgets.page)
            .allow_disk_use(true);
        let docs = self.store.find(w.predicate, &opts).await?;
        Ok(docs.iter().map(projector::project).collect())
    }

    async fn anchor_range(&self, w: &Window<'_>) -> Result<Vec<SaleRecord>, DomainError> {
        let ordering = Ordering::by(TRANSACTION_ID, w.dir);
        if w.offset == 0 {
            return self.find_ordered(w.predicate, ordering, w.page_size).await;
        }

        let probe = FindOptions::new()
            .sort(ordering.clone())
            .skip(w.offset - 1)
            .limit(1)
            .project([TRANSACTION_ID])
            .max_time(self.budgets.anchor)
            .allow_disk_use(true);
        let anchor = self
            .store
            .find(w.predicate, &probe)
            .await?
            .into_iter()
            .next()
            .and_then(|mut d: Document| d.remove(TRANSACTION_ID));
        let Some(anchor) = anchor else {
            debug!(offset = w.offset, "no anchor at offset");
            return Ok(Vec::new());
        };

        let predicate = w.predicate.clone().and(beyond(w.dir, anchor));
        self.find_ordered(&predicate, ordering, w.page_size).await
    }

    async fn find_ordered(
        &self,
        predicate: &Predicate,
        ordering: Ordering,
        limit: u64,
    ) -> Result<Vec<SaleRecord>, DomainError> {
        let opts = FindOptions::new()
            .sort(ordering)
            .limit(limit)
            .max_time(self.budgets.page)
            .allow_disk_use(true);
        let docs = self.store.find(predicate, &opts).await?;
        Ok(docs.iter().map(projector::project).collect())
    }

    async fn aggregated_window(&self, w: &Window<'_>) -> Result<Vec<SaleRecord>, DomainError> {
        let mut pipeline = Vec::with_capacity(5);
        if !w.predicate.is_universal() {
            pipeline.push(Stage::Match(w.predicate.clone()));
        }
        pipeline.extend([
            Stage::Sort(Ordering::by(TRANSACTION_ID, w.dir)),
            Stage::Skip(w.offset),
            Stage::Limit(w.page_size),
            projector::projection_stage(),
        ]);

        let opts = AggregateOptions::new()
            .max_time(self.budgets.window)
            .allow_disk_use(true);
        let rows = self.store.aggregate(&pipeline, &opts).await?;
        Ok(rows.iter().map(projector::project_window_row).collect())
    }
}

/// Identifiers strictly after `anchor` in direction `dir`.
fn beyond(dir: SortDir, anchor: Value) -> Predicate {
    let cond = match dir {
        SortDir::Desc => Condition::Lt(anchor),
        SortDir::Asc => Condition::Gt(anchor),
    };
    Predicate::field(TRANSACTION_ID, cond)
}
