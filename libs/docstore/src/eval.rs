//! Predicate evaluation and value ordering over raw documents.
//!
//! Ordering across types follows the canonical document-store order:
//! null (or missing) < numbers < strings < objects < arrays < booleans.
//! Range operators only compare values of the same type class.

use std::cmp::Ordering as CmpOrdering;

use query_core::ast::{Condition, Predicate};
use query_core::{Document, Ordering, SortDir, Value};

fn type_rank(v: Option<&Value>) -> u8 {
    match v {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order over optional values.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    let (ra, rb) = (type_rank(a), type_rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(CmpOrdering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => CmpOrdering::Equal,
    }
}

/// Compare two documents key by key.
pub fn compare_docs(a: &Document, b: &Document, ordering: &Ordering) -> CmpOrdering {
    for key in ordering.keys() {
        let ord = compare_values(a.get(&key.field), b.get(&key.field));
        let ord = match key.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        if ord != CmpOrdering::Equal {
            return ord;
        }
    }
    CmpOrdering::Equal
}

fn values_equal(field: Option<&Value>, target: &Value) -> bool {
    match (field, target) {
        // equality with null also matches a missing field
        (None, Value::Null) => true,
        (None, _) => false,
        (Some(Value::Number(x)), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Some(v), t) => v == t,
    }
}

fn same_class(field: Option<&Value>, target: &Value) -> bool {
    matches!(
        (field, target),
        (Some(Value::Number(_)), Value::Number(_)) | (Some(Value::String(_)), Value::String(_))
    )
}

fn range(field: Option<&Value>, target: &Value, accept: fn(CmpOrdering) -> bool) -> bool {
    same_class(field, target) && accept(compare_values(field, Some(target)))
}

pub fn eval_condition(field: Option<&Value>, cond: &Condition) -> bool {
    match cond {
        Condition::Eq(v) => values_equal(field, v),
        Condition::Ne(v) => !values_equal(field, v),
        Condition::In(vs) => vs.iter().any(|v| values_equal(field, v)),
        Condition::Gt(v) => range(field, v, |o| o == CmpOrdering::Greater),
        Condition::Gte(v) => range(field, v, |o| o != CmpOrdering::Less),
        Condition::Lt(v) => range(field, v, |o| o == CmpOrdering::Less),
        Condition::Lte(v) => range(field, v, |o| o != CmpOrdering::Greater),
        Condition::Matches(p) => matches!(field, Some(Value::String(s)) if p.is_match(s)),
        Condition::Exists(expected) => field.is_some() == *expected,
    }
}

pub fn matches(predicate: &Predicate, doc: &Document) -> bool {
    match predicate {
        Predicate::All => true,
        Predicate::And(parts) => parts.iter().all(|p| matches(p, doc)),
        Predicate::Or(parts) => parts.iter().any(|p| matches(p, doc)),
        Predicate::Field(name, cond) => eval_condition(doc.get(name), cond),
    }
}
