use serde_json::{json, Map, Value};

use crate::ast::Predicate;
use crate::options::Ordering;

/// One stage of a multi-stage aggregation.
#[derive(Clone, Debug, PartialEq)]
pub enum Stage {
    Match(Predicate),
    Sort(Ordering),
    Skip(u64),
    Limit(u64),
    /// Reshape each document; only the listed outputs survive.
    Project(Vec<Projection>),
    /// Collapse the whole input into one document of accumulated values.
    Group(Vec<(String, Accumulator)>),
    /// Uniform random sample without replacement.
    Sample(u64),
}

/// `output` receives the value of `source` (absent sources are omitted).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    pub output: String,
    pub source: String,
}

impl Projection {
    pub fn new(output: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            source: source.into(),
        }
    }

    /// Keep a field under its own name.
    pub fn keep(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            output: field.clone(),
            source: field,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Accumulator {
    Min(String),
    Max(String),
    Count,
}

impl Stage {
    pub fn to_native(&self) -> Value {
        match self {
            Stage::Match(p) => json!({ "$match": p.to_native() }),
            Stage::Sort(o) => json!({ "$sort": o.to_native() }),
            Stage::Skip(n) => json!({ "$skip": n }),
            Stage::Limit(n) => json!({ "$limit": n }),
            Stage::Project(fields) => {
                let mut m = Map::new();
                for p in fields {
                    m.insert(p.output.clone(), Value::String(format!("${}", p.source)));
                }
                json!({ "$project": m })
            }
            Stage::Group(accs) => {
                let mut m = Map::new();
                m.insert("_id".to_string(), Value::Null);
                for (name, acc) in accs {
                    let v = match acc {
                        Accumulator::Min(f) => json!({ "$min": format!("${f}") }),
                        Accumulator::Max(f) => json!({ "$max": format!("${f}") }),
                        Accumulator::Count => json!({ "$sum": 1 }),
                    };
                    m.insert(name.clone(), v);
                }
                json!({ "$group": m })
            }
            Stage::Sample(n) => json!({ "$sample": { "size": n } }),
        }
    }
}
