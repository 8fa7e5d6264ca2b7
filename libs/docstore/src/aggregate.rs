use std::borrow::Cow;
use std::cmp::Ordering as CmpOrdering;

use query_core::{Accumulator, AggregateOptions, Document, Projection, Stage, Value};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;

use crate::eval::{compare_values, matches};
use crate::memory::{filter_rows, ordered_window, Collection, Deadline, SortGuard};
use crate::StoreResult;

type Rows<'a> = Vec<Cow<'a, Document>>;

/// Run `pipeline` over the collection.
///
/// A `Sort` directly followed by `Skip`/`Limit` is executed as one windowed
/// sort, so only the requested window is fully ordered.
pub(crate) fn run(
    c: &Collection,
    pipeline: &[Stage],
    opts: &AggregateOptions,
) -> StoreResult<Vec<Document>> {
    let deadline = Deadline::start("aggregate", opts.max_time);
    let guard = SortGuard {
        memory_limit: c.options.sort_memory_limit,
        allow_disk_use: opts.allow_disk_use,
    };

    let mut stages = pipeline.iter().peekable();

    // A leading $match reads straight from the collection.
    let mut rows: Rows<'_> = match stages.peek().copied() {
        Some(Stage::Match(p)) => {
            stages.next();
            filter_rows(&c.docs, p, &deadline)?
                .into_iter()
                .map(Cow::Borrowed)
                .collect()
        }
        _ => c.docs.iter().map(Cow::Borrowed).collect(),
    };

    while let Some(stage) = stages.next() {
        deadline.check()?;
        rows = match stage {
            Stage::Match(p) => rows.into_iter().filter(|d| matches(p, d)).collect(),
            Stage::Sort(ordering) => {
                let mut skip = 0u64;
                let mut limit = None;
                if let Some(Stage::Skip(n)) = stages.peek().copied() {
                    skip = *n;
                    stages.next();
                }
                if let Some(Stage::Limit(n)) = stages.peek().copied() {
                    limit = Some(*n);
                    stages.next();
                }
                sort_window(rows, ordering, skip, limit, guard, &deadline)?
            }
            Stage::Skip(n) => rows
                .into_iter()
                .skip(usize::try_from(*n).unwrap_or(usize::MAX))
                .collect(),
            Stage::Limit(n) => rows
                .into_iter()
                .take(usize::try_from(*n).unwrap_or(usize::MAX))
                .collect(),
            Stage::Project(fields) => rows
                .into_iter()
                .map(|d| Cow::Owned(project(&d, fields)))
                .collect(),
            Stage::Group(accs) => group(&rows, accs).into_iter().map(Cow::Owned).collect(),
            Stage::Sample(n) => sample(rows, *n, c.options.sample_seed),
        };
    }

    deadline.check()?;
    Ok(rows.into_iter().map(Cow::into_owned).collect())
}

fn sort_window<'a>(
    rows: Rows<'a>,
    ordering: &query_core::Ordering,
    skip: u64,
    limit: Option<u64>,
    guard: SortGuard,
    deadline: &Deadline,
) -> StoreResult<Rows<'a>> {
    // Order references into `rows`, then pick the survivors out.
    let refs: Vec<&Document> = rows.iter().map(|d| &**d).collect();
    let window = ordered_window(refs, ordering, skip, limit, guard, deadline)?;
    let picked: Vec<Document> = window.into_iter().cloned().collect();
    Ok(picked.into_iter().map(Cow::Owned).collect())
}

fn project(doc: &Document, fields: &[Projection]) -> Document {
    let mut out = Document::new();
    for p in fields {
        if let Some(v) = doc.get(&p.source) {
            out.insert(p.output.clone(), v.clone());
        }
    }
    out
}

/// Whole-input group; empty input yields no document.
fn group(rows: &Rows<'_>, accs: &[(String, Accumulator)]) -> Option<Document> {
    if rows.is_empty() {
        return None;
    }
    let mut out = Document::new();
    out.insert("_id".to_string(), Value::Null);
    for (name, acc) in accs {
        let value = match acc {
            Accumulator::Count => Value::from(rows.len() as u64),
            Accumulator::Min(field) => extreme(rows, field, CmpOrdering::Less),
            Accumulator::Max(field) => extreme(rows, field, CmpOrdering::Greater),
        };
        out.insert(name.clone(), value);
    }
    Some(out)
}

/// Min or max of `field`, ignoring null and missing values.
fn extreme(rows: &Rows<'_>, field: &str, wanted: CmpOrdering) -> Value {
    let mut best: Option<&Value> = None;
    for v in rows.iter().filter_map(|d| d.get(field)) {
        if v.is_null() {
            continue;
        }
        if best.map_or(true, |b| compare_values(Some(v), Some(b)) == wanted) {
            best = Some(v);
        }
    }
    best.cloned().unwrap_or(Value::Null)
}

fn sample(mut rows: Rows<'_>, size: u64, seed: Option<u64>) -> Rows<'_> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let size = usize::try_from(size).unwrap_or(usize::MAX);
    if size >= rows.len() {
        rows.shuffle(&mut rng);
        return rows;
    }
    let mut picked = index::sample(&mut rng, rows.len(), size).into_vec();
    picked.sort_unstable();
    // Drain in ascending index order, keeping only the picked positions.
    let mut wanted = picked.into_iter().peekable();
    rows.into_iter()
        .enumerate()
        .filter_map(|(i, d)| {
            if wanted.peek() == Some(&i) {
                wanted.next();
                Some(d)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{DocumentStore, MemoryStore, MemoryStoreOptions};
    use query_core::ast::{Condition, Predicate};
    use query_core::{Accumulator, AggregateOptions, Ordering, Projection, SortDir, Stage};
    use serde_json::{json, Value};

    fn store() -> MemoryStore {
        let docs = (1..=30u64)
            .map(|id| {
                let mut v = json!({ "Transaction ID": id, "Age": 18 + id, "Tags": "a,b" });
                if id % 10 == 0 {
                    v["Tags"] = json!("");
                }
                match v {
                    Value::Object(m) => m,
                    _ => unreachable!(),
                }
            })
            .collect();
        MemoryStore::new(
            "sales",
            docs,
            MemoryStoreOptions {
                sort_memory_limit: None,
                sample_seed: Some(7),
            },
        )
    }

    #[tokio::test]
    async fn match_sort_skip_limit_project() {
        let pipeline = vec![
            Stage::Match(Predicate::field("Age", Condition::Gte(json!(25)))),
            Stage::Sort(Ordering::by("Transaction ID", SortDir::Desc)),
            Stage::Skip(2),
            Stage::Limit(3),
            Stage::Project(vec![Projection::new("id", "Transaction ID")]),
        ];
        let out = store()
            .aggregate(&pipeline, &AggregateOptions::new())
            .await
            .unwrap();
        let ids: Vec<_> = out.iter().map(|d| d["id"].clone()).collect();
        assert_eq!(ids, vec![json!(28), json!(27), json!(26)]);
        assert_eq!(out[0].len(), 1);
    }

    #[tokio::test]
    async fn group_min_max() {
        let pipeline = vec![Stage::Group(vec![
            ("minAge".into(), Accumulator::Min("Age".into())),
            ("maxAge".into(), Accumulator::Max("Age".into())),
            ("n".into(), Accumulator::Count),
        ])];
        let out = store()
            .aggregate(&pipeline, &AggregateOptions::new())
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["minAge"], json!(19));
        assert_eq!(out[0]["maxAge"], json!(48));
        assert_eq!(out[0]["n"], json!(30));
    }

    #[tokio::test]
    async fn group_over_nothing_is_empty() {
        let pipeline = vec![
            Stage::Match(Predicate::Or(vec![])),
            Stage::Group(vec![("minAge".into(), Accumulator::Min("Age".into()))]),
        ];
        let out = store()
            .aggregate(&pipeline, &AggregateOptions::new())
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn sample_respects_size_and_match() {
        let pipeline = vec![
            Stage::Match(Predicate::field("Tags", Condition::Ne(json!("")))),
            Stage::Sample(5),
            Stage::Project(vec![Projection::keep("Tags")]),
        ];
        let out = store()
            .aggregate(&pipeline, &AggregateOptions::new())
            .await
            .unwrap();
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|d| d["Tags"] == json!("a,b")));

        let all = vec![Stage::Sample(1_000)];
        let out = store().aggregate(&all, &AggregateOptions::new()).await.unwrap();
        assert_eq!(out.len(), 30);
    }
}
