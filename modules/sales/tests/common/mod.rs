#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docstore::{DocumentStore, MemoryStore, MemoryStoreOptions, StoreError, StoreResult};
use query_core::ast::{Condition, Predicate};
use query_core::{AggregateOptions, Document, FindOptions, Ordering, SortDir, Stage, Value};
use sales::config::SalesConfig;
use sales::domain::fields;
use sales::domain::filter_options::FilterOptionsCache;
use sales::domain::service::Service;
use sales::infra::storage::synthetic;

pub fn synthetic_store(records: u64) -> MemoryStore {
    synthetic::memory_store(
        "sales_data",
        records,
        42,
        MemoryStoreOptions {
            sample_seed: Some(7),
            ..MemoryStoreOptions::default()
        },
    )
}

pub fn service_over(store: Arc<dyn DocumentStore>, cfg: &SalesConfig) -> Service {
    let cache = Arc::new(FilterOptionsCache::new(
        store.clone(),
        cfg.filter_options_settings(),
    ));
    Service::new(
        store,
        cache,
        cfg.thresholds(),
        cfg.budgets(),
        cfg.service_config(),
    )
}

/// Collection of `len` records with identifiers `1..=len`, answered
/// arithmetically so that 700k-record scenarios stay cheap. Supports the
/// predicates and pipelines the pagination strategies issue on unfiltered
/// requests: identifier bounds, identifier ordering, skip/limit, projection.
pub struct SequentialStore {
    len: u64,
    pub finds: AtomicUsize,
    pub aggregates: AtomicUsize,
    pub counts: AtomicUsize,
    pub estimates: AtomicUsize,
}

impl SequentialStore {
    pub fn new(len: u64) -> Self {
        Self {
            len,
            finds: AtomicUsize::new(0),
            aggregates: AtomicUsize::new(0),
            counts: AtomicUsize::new(0),
            estimates: AtomicUsize::new(0),
        }
    }

    pub fn doc(id: u64) -> Document {
        const REGIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];
        let mut d = Document::new();
        d.insert(fields::TRANSACTION_ID.into(), Value::from(id));
        d.insert(
            fields::CUSTOMER_REGION.into(),
            Value::from(REGIONS[(id % 5) as usize]),
        );
        d.insert(fields::AGE.into(), Value::from(18 + id % 48));
        d.insert(fields::CUSTOMER_NAME.into(), Value::from(format!("Customer {id}")));
        d
    }

    /// Inclusive identifier bounds of a predicate, or `None` when empty.
    fn bounds(&self, p: &Predicate) -> StoreResult<Option<(u64, u64)>> {
        let mut lo = 1u64;
        let mut hi = self.len;
        self.narrow(p, &mut lo, &mut hi)?;
        Ok((lo <= hi && hi >= 1).then_some((lo, hi)))
    }

    fn narrow(&self, p: &Predicate, lo: &mut u64, hi: &mut u64) -> StoreResult<()> {
        match p {
            Predicate::All => Ok(()),
            Predicate::And(parts) => parts.iter().try_for_each(|q| self.narrow(q, lo, hi)),
            Predicate::Field(f, cond) if f == fields::TRANSACTION_ID => {
                let bound = |v: &Value| {
                    v.as_u64()
                        .ok_or_else(|| StoreError::InvalidQuery(format!("bad id bound {v}")))
                };
                match cond {
                    Condition::Lt(v) => *hi = (*hi).min(bound(v)?.saturating_sub(1)),
                    Condition::Lte(v) => *hi = (*hi).min(bound(v)?),
                    Condition::Gt(v) => *lo = (*lo).max(bound(v)? + 1),
                    Condition::Gte(v) => *lo = (*lo).max(bound(v)?),
                    other => {
                        return Err(StoreError::InvalidQuery(format!("unsupported {other:?}")))
                    }
                }
                Ok(())
            }
            other => Err(StoreError::InvalidQuery(format!("unsupported {other:?}"))),
        }
    }

    fn direction(ordering: &Ordering) -> StoreResult<SortDir> {
        match ordering.primary() {
            None => Ok(SortDir::Asc),
            Some(k) if k.field == fields::TRANSACTION_ID => Ok(k.dir),
            Some(k) => Err(StoreError::InvalidQuery(format!("cannot sort by {}", k.field))),
        }
    }

    fn window(
        &self,
        filter: &Predicate,
        dir: SortDir,
        skip: u64,
        limit: Option<u64>,
    ) -> StoreResult<Vec<Document>> {
        let Some((lo, hi)) = self.bounds(filter)? else {
            return Ok(Vec::new());
        };
        let available = hi - lo + 1;
        if skip >= available {
            return Ok(Vec::new());
        }
        let take = limit.filter(|l| *l > 0).unwrap_or(available).min(available - skip);
        let ids: Vec<u64> = match dir {
            SortDir::Asc => (lo + skip..lo + skip + take).collect(),
            SortDir::Desc => (0..take).map(|i| hi - skip - i).collect(),
        };
        Ok(ids.into_iter().map(Self::doc).collect())
    }
}

#[async_trait]
impl DocumentStore for SequentialStore {
    async fn find(&self, filter: &Predicate, opts: &FindOptions) -> StoreResult<Vec<Document>> {
        self.finds.fetch_add(1, AtomicOrdering::SeqCst);
        let dir = Self::direction(&opts.ordering)?;
        let mut docs = self.window(filter, dir, opts.skip, opts.limit)?;
        if let Some(keep) = &opts.projection {
            for d in &mut docs {
                d.retain(|k, _| keep.contains(k));
            }
        }
        Ok(docs)
    }

    async fn count(&self, filter: &Predicate, _max_time: Option<Duration>) -> StoreResult<u64> {
        self.counts.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(self.bounds(filter)?.map_or(0, |(lo, hi)| hi - lo + 1))
    }

    async fn estimated_count(&self) -> StoreResult<u64> {
        self.estimates.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(self.len)
    }

    async fn aggregate(
        &self,
        pipeline: &[Stage],
        _opts: &AggregateOptions,
    ) -> StoreResult<Vec<Document>> {
        self.aggregates.fetch_add(1, AtomicOrdering::SeqCst);
        let mut filter = Predicate::All;
        let mut dir = SortDir::Asc;
        let mut skip = 0;
        let mut limit = None;
        let mut projection = None;
        for stage in pipeline {
            match stage {
                Stage::Match(p) => filter = p.clone(),
                Stage::Sort(o) => dir = Self::direction(o)?,
                Stage::Skip(n) => skip = *n,
                Stage::Limit(n) => limit = Some(*n),
                Stage::Project(cols) => projection = Some(cols.clone()),
                other => {
                    return Err(StoreError::InvalidQuery(format!("unsupported {other:?}")))
                }
            }
        }
        let docs = self.window(&filter, dir, skip, limit)?;
        Ok(match projection {
            None => docs,
            Some(cols) => docs
                .into_iter()
                .map(|d| {
                    cols.iter()
                        .filter_map(|c| d.get(&c.source).map(|v| (c.output.clone(), v.clone())))
                        .collect()
                })
                .collect(),
        })
    }

    async fn distinct(
        &self,
        _field: &str,
        _filter: &Predicate,
        _max_time: Option<Duration>,
    ) -> StoreResult<Vec<Value>> {
        Err(StoreError::unavailable("distinct is not supported here"))
    }
}

/// Wraps a real store and injects failures or blank results on demand,
/// counting the calls that reach it.
pub struct FaultyStore {
    inner: Arc<dyn DocumentStore>,
    pub down: AtomicBool,
    pub count_times_out: AtomicBool,
    pub estimate_fails: AtomicBool,
    /// Number of upcoming finds answered with no documents.
    pub blank_finds: AtomicUsize,
    pub finds: AtomicUsize,
    pub counts: AtomicUsize,
    pub distincts: AtomicUsize,
    pub aggregates: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner,
            down: AtomicBool::new(false),
            count_times_out: AtomicBool::new(false),
            estimate_fails: AtomicBool::new(false),
            blank_finds: AtomicUsize::new(0),
            finds: AtomicUsize::new(0),
            counts: AtomicUsize::new(0),
            distincts: AtomicUsize::new(0),
            aggregates: AtomicUsize::new(0),
        }
    }

    pub fn set(flag: &AtomicBool, on: bool) {
        flag.store(on, AtomicOrdering::SeqCst);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(AtomicOrdering::SeqCst)
    }

    fn check_up(&self) -> StoreResult<()> {
        if self.down.load(AtomicOrdering::SeqCst) {
            Err(StoreError::unavailable("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn find(&self, filter: &Predicate, opts: &FindOptions) -> StoreResult<Vec<Document>> {
        self.finds.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_up()?;
        let blank = self
            .blank_finds
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |n| {
                n.checked_sub(1)
            })
            .is_ok();
        if blank {
            return Ok(Vec::new());
        }
        self.inner.find(filter, opts).await
    }

    async fn count(&self, filter: &Predicate, max_time: Option<Duration>) -> StoreResult<u64> {
        self.counts.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_up()?;
        if self.count_times_out.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::timeout(
                "count",
                max_time.unwrap_or(Duration::ZERO),
            ));
        }
        self.inner.count(filter, max_time).await
    }

    async fn estimated_count(&self) -> StoreResult<u64> {
        self.check_up()?;
        if self.estimate_fails.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::unavailable("collection stats unavailable"));
        }
        self.inner.estimated_count().await
    }

    async fn aggregate(
        &self,
        pipeline: &[Stage],
        opts: &AggregateOptions,
    ) -> StoreResult<Vec<Document>> {
        self.aggregates.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_up()?;
        self.inner.aggregate(pipeline, opts).await
    }

    async fn distinct(
        &self,
        field: &str,
        filter: &Predicate,
        max_time: Option<Duration>,
    ) -> StoreResult<Vec<Value>> {
        self.distincts.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_up()?;
        self.inner.distinct(field, filter, max_time).await
    }
}

pub fn ids(records: &[sales::contract::model::SaleRecord]) -> Vec<i64> {
    records.iter().filter_map(|r| r.id).collect()
}
