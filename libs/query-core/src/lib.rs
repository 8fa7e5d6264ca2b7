//! Store-native query vocabulary shared by the document store and its callers.
//!
//! Callers build [`ast::Predicate`] values and option bags; evaluation belongs
//! to a store backend (see the `docstore` crate).

pub mod options;
pub mod pipeline;

pub use options::{AggregateOptions, FindOptions, OrderKey, Ordering, SortDir};
pub use pipeline::{Accumulator, Projection, Stage};

/// A raw record as held by the store.
pub type Document = serde_json::Map<String, serde_json::Value>;
pub use serde_json::Value;

pub mod ast {
    use regex::{Regex, RegexBuilder};
    use serde_json::{json, Map, Value};

    /// Boolean condition over documents.
    #[derive(Clone, Debug, PartialEq)]
    pub enum Predicate {
        /// Matches every document.
        All,
        And(Vec<Predicate>),
        /// An empty disjunction matches nothing.
        Or(Vec<Predicate>),
        Field(String, Condition),
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum Condition {
        Eq(Value),
        Ne(Value),
        In(Vec<Value>),
        Gt(Value),
        Gte(Value),
        Lt(Value),
        Lte(Value),
        Matches(Pattern),
        Exists(bool),
    }

    /// Compiled regular expression that still compares by its source text.
    #[derive(Clone, Debug)]
    pub struct Pattern {
        source: String,
        case_insensitive: bool,
        compiled: Regex,
    }

    impl PartialEq for Pattern {
        fn eq(&self, other: &Self) -> bool {
            self.source == other.source && self.case_insensitive == other.case_insensitive
        }
    }

    impl Pattern {
        pub fn new(source: impl Into<String>, case_insensitive: bool) -> Result<Self, regex::Error> {
            let source = source.into();
            let compiled = RegexBuilder::new(&source)
                .case_insensitive(case_insensitive)
                .build()?;
            Ok(Self {
                source,
                case_insensitive,
                compiled,
            })
        }

        /// Substring match on `text` taken literally.
        pub fn literal(text: &str, case_insensitive: bool) -> Result<Self, regex::Error> {
            Self::new(regex::escape(text), case_insensitive)
        }

        /// Substring match on any of `alternatives`, each taken literally.
        pub fn any_literal<S: AsRef<str>>(
            alternatives: &[S],
            case_insensitive: bool,
        ) -> Result<Self, regex::Error> {
            let joined = alternatives
                .iter()
                .map(|s| regex::escape(s.as_ref()))
                .collect::<Vec<_>>()
                .join("|");
            Self::new(joined, case_insensitive)
        }

        pub fn as_str(&self) -> &str {
            &self.source
        }

        pub fn case_insensitive(&self) -> bool {
            self.case_insensitive
        }

        pub fn is_match(&self, haystack: &str) -> bool {
            self.compiled.is_match(haystack)
        }
    }

    impl Predicate {
        pub fn field(name: impl Into<String>, cond: Condition) -> Self {
            Predicate::Field(name.into(), cond)
        }

        /// True when the predicate places no restriction at all.
        pub fn is_universal(&self) -> bool {
            match self {
                Predicate::All => true,
                Predicate::And(parts) => parts.iter().all(Predicate::is_universal),
                _ => false,
            }
        }

        /// Conjunction that absorbs universal operands.
        pub fn all_of(parts: Vec<Predicate>) -> Self {
            let mut kept: Vec<Predicate> = parts.into_iter().filter(|p| !p.is_universal()).collect();
            match kept.len() {
                0 => Predicate::All,
                1 => kept.remove(0),
                _ => Predicate::And(kept),
            }
        }

        pub fn and(self, other: Predicate) -> Self {
            Self::all_of(vec![self, other])
        }

        /// Render the predicate in the store's native JSON dialect.
        pub fn to_native(&self) -> Value {
            match self {
                Predicate::All => Value::Object(Map::new()),
                Predicate::And(parts) => {
                    json!({ "$and": parts.iter().map(Predicate::to_native).collect::<Vec<_>>() })
                }
                Predicate::Or(parts) => {
                    json!({ "$or": parts.iter().map(Predicate::to_native).collect::<Vec<_>>() })
                }
                Predicate::Field(name, cond) => {
                    let mut m = Map::new();
                    m.insert(name.clone(), cond.to_native());
                    Value::Object(m)
                }
            }
        }
    }

    impl Condition {
        pub fn to_native(&self) -> Value {
            match self {
                Condition::Eq(v) => v.clone(),
                Condition::Ne(v) => json!({ "$ne": v }),
                Condition::In(vs) => json!({ "$in": vs }),
                Condition::Gt(v) => json!({ "$gt": v }),
                Condition::Gte(v) => json!({ "$gte": v }),
                Condition::Lt(v) => json!({ "$lt": v }),
                Condition::Lte(v) => json!({ "$lte": v }),
                Condition::Matches(p) => {
                    if p.case_insensitive() {
                        json!({ "$regex": p.as_str(), "$options": "i" })
                    } else {
                        json!({ "$regex": p.as_str() })
                    }
                }
                Condition::Exists(b) => json!({ "$exists": b }),
            }
        }
    }
}

#[cfg(test)]
mod tests;
