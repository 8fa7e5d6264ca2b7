use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    /// Native sign: 1 for ascending, -1 for descending.
    pub fn sign(self) -> i32 {
        match self {
            SortDir::Asc => 1,
            SortDir::Desc => -1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub dir: SortDir,
}

/// Ordered list of sort keys; earlier keys take precedence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ordering(pub Vec<OrderKey>);

impl Ordering {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn by(field: impl Into<String>, dir: SortDir) -> Self {
        Self(vec![OrderKey {
            field: field.into(),
            dir,
        }])
    }

    pub fn then(mut self, field: impl Into<String>, dir: SortDir) -> Self {
        self.0.push(OrderKey {
            field: field.into(),
            dir,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> &[OrderKey] {
        &self.0
    }

    pub fn primary(&self) -> Option<&OrderKey> {
        self.0.first()
    }

    /// Append `field` as a final key unless it is already present.
    pub fn ensure_tiebreaker(mut self, field: &str, dir: SortDir) -> Self {
        if !self.0.iter().any(|k| k.field == field) {
            self.0.push(OrderKey {
                field: field.to_string(),
                dir,
            });
        }
        self
    }

    /// Compact form used in logs, e.g. `-Date,-Transaction ID`.
    pub fn to_signed_tokens(&self) -> String {
        self.0
            .iter()
            .map(|k| match k.dir {
                SortDir::Asc => format!("+{}", k.field),
                SortDir::Desc => format!("-{}", k.field),
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn to_native(&self) -> Value {
        let mut m = Map::new();
        for k in &self.0 {
            m.insert(k.field.clone(), Value::from(k.dir.sign()));
        }
        Value::Object(m)
    }
}

/// Options for a predicate-based find.
#[derive(Clone, Debug, Default)]
pub struct FindOptions {
    pub ordering: Ordering,
    pub skip: u64,
    pub limit: Option<u64>,
    /// Restrict returned documents to these fields.
    pub projection: Option<Vec<String>>,
    pub max_time: Option<Duration>,
    /// Permit sorts that exceed the in-memory sort limit.
    pub allow_disk_use: bool,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn max_time(mut self, budget: Duration) -> Self {
        self.max_time = Some(budget);
        self
    }

    pub fn allow_disk_use(mut self, allow: bool) -> Self {
        self.allow_disk_use = allow;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct AggregateOptions {
    pub max_time: Option<Duration>,
    pub allow_disk_use: bool,
}

impl AggregateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_time(mut self, budget: Duration) -> Self {
        self.max_time = Some(budget);
        self
    }

    pub fn allow_disk_use(mut self, allow: bool) -> Self {
        self.allow_disk_use = allow;
        self
    }
}
