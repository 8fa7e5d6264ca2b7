use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use query_core::ast::Predicate;
use query_core::{AggregateOptions, Document, FindOptions, Ordering, Stage, Value};
use tracing::{debug, info};

use crate::eval::{compare_docs, matches};
use crate::loader::{load_documents, DatasetFormat};
use crate::{aggregate, DocumentStore, StoreError, StoreResult};

/// Documents visited between two deadline checks.
const CHECK_EVERY: usize = 4096;

#[derive(Clone, Debug, Default)]
pub struct MemoryStoreOptions {
    /// Largest input a sort may hold without `allow_disk_use`.
    pub sort_memory_limit: Option<usize>,
    /// Seed for `$sample`; random per call when unset.
    pub sample_seed: Option<u64>,
}

pub(crate) struct Collection {
    pub(crate) name: String,
    pub(crate) docs: Vec<Document>,
    pub(crate) options: MemoryStoreOptions,
}

/// Immutable in-memory collection. Cheap to clone.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Collection>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("collection", &self.inner.name)
            .field("documents", &self.inner.docs.len())
            .finish()
    }
}

impl MemoryStore {
    pub fn new(name: impl Into<String>, docs: Vec<Document>, options: MemoryStoreOptions) -> Self {
        Self {
            inner: Arc::new(Collection {
                name: name.into(),
                docs,
                options,
            }),
        }
    }

    /// Load a dataset file into a new collection.
    pub fn open(
        name: impl Into<String>,
        path: &Path,
        format: DatasetFormat,
        options: MemoryStoreOptions,
    ) -> StoreResult<Self> {
        let name = name.into();
        let docs = load_documents(path, format)?;
        info!(collection = %name, path = %path.display(), documents = docs.len(), "dataset loaded");
        Ok(Self::new(name, docs, options))
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn len(&self) -> usize {
        self.inner.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.docs.is_empty()
    }

    async fn run_blocking<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Collection) -> StoreResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&inner))
            .await
            .map_err(|e| StoreError::unavailable(format!("store worker failed: {e}")))?
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Deadline {
    operation: &'static str,
    budget: Option<Duration>,
    started: Instant,
}

impl Deadline {
    pub(crate) fn start(operation: &'static str, budget: Option<Duration>) -> Self {
        Self {
            operation,
            budget,
            started: Instant::now(),
        }
    }

    pub(crate) fn check(&self) -> StoreResult<()> {
        match self.budget {
            Some(budget) if self.started.elapsed() >= budget => {
                Err(StoreError::timeout(self.operation, budget))
            }
            _ => Ok(()),
        }
    }

    /// Check on every `CHECK_EVERY`-th step.
    pub(crate) fn tick(&self, step: usize) -> StoreResult<()> {
        if step % CHECK_EVERY == 0 {
            self.check()
        } else {
            Ok(())
        }
    }
}

pub(crate) fn filter_rows<'a, I>(
    rows: I,
    predicate: &Predicate,
    deadline: &Deadline,
) -> StoreResult<Vec<&'a Document>>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut out = Vec::new();
    for (i, doc) in rows.into_iter().enumerate() {
        deadline.tick(i)?;
        if matches(predicate, doc) {
            out.push(doc);
        }
    }
    Ok(out)
}

/// Sort `rows` and cut the `[skip, skip + limit)` window.
///
/// Only the first `skip + limit` positions are fully ordered; the rest is
/// partitioned away with a selection pass.
pub(crate) fn ordered_window<'a>(
    mut rows: Vec<&'a Document>,
    ordering: &Ordering,
    skip: u64,
    limit: Option<u64>,
    sort_guard: SortGuard,
    deadline: &Deadline,
) -> StoreResult<Vec<&'a Document>> {
    let skip = usize::try_from(skip).unwrap_or(usize::MAX);
    let end = match limit.filter(|l| *l > 0) {
        Some(l) => skip.saturating_add(usize::try_from(l).unwrap_or(usize::MAX)),
        None => rows.len(),
    }
    .min(rows.len());

    if skip >= end {
        return Ok(Vec::new());
    }

    if !ordering.is_empty() {
        sort_guard.admit(rows.len())?;
        let cmp = |a: &&Document, b: &&Document| compare_docs(a, b, ordering);
        if end < rows.len() {
            rows.select_nth_unstable_by(end, cmp);
            rows.truncate(end);
        }
        deadline.check()?;
        rows.sort_by(cmp);
        deadline.check()?;
    }

    rows.truncate(end);
    Ok(rows.split_off(skip))
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct SortGuard {
    pub(crate) memory_limit: Option<usize>,
    pub(crate) allow_disk_use: bool,
}

impl SortGuard {
    fn admit(&self, rows: usize) -> StoreResult<()> {
        match self.memory_limit {
            Some(limit) if !self.allow_disk_use && rows > limit => {
                Err(StoreError::SortMemoryLimit { rows, limit })
            }
            _ => Ok(()),
        }
    }
}

fn project_fields(doc: &Document, fields: &[String]) -> Document {
    fields
        .iter()
        .filter_map(|f| doc.get(f).map(|v| (f.clone(), v.clone())))
        .collect()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, filter: &Predicate, opts: &FindOptions) -> StoreResult<Vec<Document>> {
        let filter = filter.clone();
        let opts = opts.clone();
        self.run_blocking(move |c| {
            let deadline = Deadline::start("find", opts.max_time);
            let rows = if filter.is_universal() {
                c.docs.iter().collect()
            } else {
                filter_rows(&c.docs, &filter, &deadline)?
            };
            let guard = SortGuard {
                memory_limit: c.options.sort_memory_limit,
                allow_disk_use: opts.allow_disk_use,
            };
            let window = ordered_window(rows, &opts.ordering, opts.skip, opts.limit, guard, &deadline)?;
            debug!(collection = %c.name, returned = window.len(), skip = opts.skip, "find");
            Ok(window
                .into_iter()
                .map(|d| match &opts.projection {
                    Some(fields) => project_fields(d, fields),
                    None => d.clone(),
                })
                .collect())
        })
        .await
    }

    async fn count(&self, filter: &Predicate, max_time: Option<Duration>) -> StoreResult<u64> {
        if filter.is_universal() {
            return Ok(self.inner.docs.len() as u64);
        }
        let filter = filter.clone();
        self.run_blocking(move |c| {
            let deadline = Deadline::start("count", max_time);
            let mut n = 0u64;
            for (i, doc) in c.docs.iter().enumerate() {
                deadline.tick(i)?;
                if matches(&filter, doc) {
                    n += 1;
                }
            }
            Ok(n)
        })
        .await
    }

    async fn estimated_count(&self) -> StoreResult<u64> {
        Ok(self.inner.docs.len() as u64)
    }

    async fn aggregate(
        &self,
        pipeline: &[Stage],
        opts: &AggregateOptions,
    ) -> StoreResult<Vec<Document>> {
        let pipeline = pipeline.to_vec();
        let opts = opts.clone();
        self.run_blocking(move |c| aggregate::run(c, &pipeline, &opts)).await
    }

    async fn distinct(
        &self,
        field: &str,
        filter: &Predicate,
        max_time: Option<Duration>,
    ) -> StoreResult<Vec<Value>> {
        let field = field.to_string();
        let filter = filter.clone();
        self.run_blocking(move |c| {
            let deadline = Deadline::start("distinct", max_time);
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            for (i, doc) in c.docs.iter().enumerate() {
                deadline.tick(i)?;
                if !matches(&filter, doc) {
                    continue;
                }
                if let Some(v) = doc.get(&field) {
                    if seen.insert(v.to_string()) {
                        out.push(v.clone());
                    }
                }
            }
            Ok(out)
        })
        .await
    }
}
