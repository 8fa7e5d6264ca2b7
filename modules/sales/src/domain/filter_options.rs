use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use docstore::DocumentStore;
use query_core::ast::{Condition, Predicate};
use query_core::{Accumulator, AggregateOptions, Projection, Stage, Value};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::contract::model::{AgeRange, FilterOptions};
use crate::domain::error::DomainError;
use crate::domain::fields;
use crate::domain::projector::as_int;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptionsSettings {
    pub ttl: Duration,
    pub scan_budget: Duration,
    pub tag_sample_size: u64,
    pub tag_limit: usize,
}

impl Default for FilterOptionsSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            scan_budget: Duration::from_secs(30),
            tag_sample_size: 10_000,
            tag_limit: 100,
        }
    }
}

struct Snapshot {
    options: Arc<FilterOptions>,
    refreshed_at: Instant,
}

/// Time-bounded cache of facet values.
///
/// Readers get the current snapshot while it is younger than the TTL. An
/// expired or missing snapshot is rebuilt inline and swapped in whole, so a
/// reader sees either the old or the new snapshot. Concurrent misses may
/// each rebuild; the last one to finish wins.
pub struct FilterOptionsCache {
    store: Arc<dyn DocumentStore>,
    settings: FilterOptionsSettings,
    snapshot: ArcSwapOption<Snapshot>,
}

impl FilterOptionsCache {
    pub fn new(store: Arc<dyn DocumentStore>, settings: FilterOptionsSettings) -> Self {
        Self {
            store,
            settings,
            snapshot: ArcSwapOption::empty(),
        }
    }

    pub async fn get(&self) -> Arc<FilterOptions> {
        if let Some(snap) = self.snapshot.load_full() {
            if snap.refreshed_at.elapsed() < self.settings.ttl {
                return snap.options.clone();
            }
            debug!("filter options expired");
        }
        self.refresh().await
    }

    pub async fn force_refresh(&self) -> Arc<FilterOptions> {
        self.refresh().await
    }

    async fn refresh(&self) -> Arc<FilterOptions> {
        let started = Instant::now();
        match self.compute().await {
            Ok(options) => {
                let options = Arc::new(options);
                self.snapshot.store(Some(Arc::new(Snapshot {
                    options: options.clone(),
                    refreshed_at: Instant::now(),
                })));
                info!(
                    regions = options.customer_regions.len(),
                    tags = options.tags.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "filter options refreshed"
                );
                options
            }
            Err(e) => match self.snapshot.load_full() {
                Some(stale) => {
                    warn!(error = %e, "filter options refresh failed; serving the previous snapshot");
                    stale.options.clone()
                }
                None => {
                    warn!(error = %e, "filter options refresh failed; serving empty options");
                    Arc::new(FilterOptions::default())
                }
            },
        }
    }

    async fn compute(&self) -> Result<FilterOptions, DomainError> {
        let (customer_regions, genders, product_categories, payment_methods, age_range, tags) = tokio::try_join!(
            self.distinct(fields::CUSTOMER_REGION),
            self.distinct(fields::GENDER),
            self.distinct(fields::PRODUCT_CATEGORY),
            self.distinct(fields::PAYMENT_METHOD),
            self.age_range(),
            self.tag_vocabulary(),
        )?;

        Ok(FilterOptions {
            customer_regions,
            genders,
            product_categories,
            payment_methods,
            tags,
            age_range,
        })
    }

    async fn distinct(&self, field: &str) -> Result<Vec<String>, DomainError> {
        let values = self
            .store
            .distinct(field, &Predicate::All, Some(self.settings.scan_budget))
            .await?;
        let set: BTreeSet<String> = values.iter().filter_map(facet_value).collect();
        Ok(set.into_iter().collect())
    }

    async fn age_range(&self) -> Result<AgeRange, DomainError> {
        let pipeline = [Stage::Group(vec![
            ("minAge".to_string(), Accumulator::Min(fields::AGE.to_string())),
            ("maxAge".to_string(), Accumulator::Max(fields::AGE.to_string())),
        ])];
        let rows = self.store.aggregate(&pipeline, &self.scan_options()).await?;

        let default = AgeRange::default();
        let Some(row) = rows.first() else {
            return Ok(default);
        };
        Ok(AgeRange {
            min: row.get("minAge").and_then(as_int).unwrap_or(default.min),
            max: row.get("maxAge").and_then(as_int).unwrap_or(default.max),
        })
    }

    async fn tag_vocabulary(&self) -> Result<Vec<String>, DomainError> {
        let has_tags = Predicate::all_of(vec![
            Predicate::field(fields::TAGS, Condition::Exists(true)),
            Predicate::field(fields::TAGS, Condition::Ne(Value::Null)),
            Predicate::field(fields::TAGS, Condition::Ne(Value::from(""))),
        ]);
        let pipeline = [
            Stage::Match(has_tags),
            Stage::Sample(self.settings.tag_sample_size),
            Stage::Project(vec![Projection::keep(fields::TAGS)]),
        ];
        let rows = self.store.aggregate(&pipeline, &self.scan_options()).await?;

        let vocabulary: BTreeSet<&str> = rows
            .iter()
            .filter_map(|r| r.get(fields::TAGS).and_then(Value::as_str))
            .flat_map(|tags| tags.split(','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        Ok(vocabulary
            .into_iter()
            .take(self.settings.tag_limit)
            .map(str::to_string)
            .collect())
    }

    fn scan_options(&self) -> AggregateOptions {
        AggregateOptions::new()
            .max_time(self.settings.scan_budget)
            .allow_disk_use(true)
    }
}

fn facet_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
