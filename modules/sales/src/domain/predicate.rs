//! Translates facet selections and free-text search into store predicates.
//!
//! An empty selection always yields [`Predicate::All`], which the store and
//! the count estimator treat as "no filter". A selection that cannot be
//! compiled matches nothing instead.

use query_core::ast::{Condition, Pattern, Predicate};
use query_core::Value;
use tracing::warn;

use crate::contract::model::{FilterSpec, SearchSpec};
use crate::domain::fields;

/// Text fields searched by case-insensitive substring.
const TEXT_SEARCH_FIELDS: [&str; 6] = [
    fields::CUSTOMER_NAME,
    fields::CUSTOMER_ID,
    fields::PRODUCT_ID,
    fields::EMPLOYEE_NAME,
    fields::PRODUCT_NAME,
    fields::BRAND,
];

/// Numeric fields searched by equality when the token carries digits.
const NUMERIC_SEARCH_FIELDS: [&str; 5] = [
    fields::TRANSACTION_ID,
    fields::AGE,
    fields::QUANTITY,
    fields::TOTAL_AMOUNT,
    fields::PHONE_NUMBER,
];

const LOG_PREVIEW_CHARS: usize = 200;

pub fn build_filter_predicate(spec: &FilterSpec) -> Predicate {
    let mut parts = Vec::new();

    push_in(&mut parts, fields::CUSTOMER_REGION, &spec.customer_regions);
    push_in(&mut parts, fields::GENDER, &spec.genders);
    push_in(&mut parts, fields::PRODUCT_CATEGORY, &spec.product_categories);
    push_in(&mut parts, fields::PAYMENT_METHOD, &spec.payment_methods);

    let tags: Vec<&str> = spec
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if !tags.is_empty() {
        match Pattern::any_literal(tags.as_slice(), true) {
            Ok(p) => parts.push(Predicate::field(fields::TAGS, Condition::Matches(p))),
            Err(e) => {
                warn!(error = %e, "tag selection does not compile; matching nothing");
                parts.push(match_nothing());
            }
        }
    }

    if let Some(min) = spec.age_min {
        parts.push(Predicate::field(fields::AGE, Condition::Gte(Value::from(min))));
    }
    if let Some(max) = spec.age_max {
        parts.push(Predicate::field(fields::AGE, Condition::Lte(Value::from(max))));
    }
    if let Some(start) = non_blank(spec.date_start.as_deref()) {
        parts.push(Predicate::field(fields::DATE, Condition::Gte(Value::from(start))));
    }
    if let Some(end) = non_blank(spec.date_end.as_deref()) {
        parts.push(Predicate::field(fields::DATE, Condition::Lte(Value::from(end))));
    }

    Predicate::all_of(parts)
}

pub fn build_search_predicate(spec: &SearchSpec) -> Predicate {
    let token = spec.token.trim();
    if token.is_empty() {
        return Predicate::All;
    }

    let mut disjuncts = Vec::new();
    match Pattern::literal(token, true) {
        Ok(pattern) => disjuncts.extend(
            TEXT_SEARCH_FIELDS
                .iter()
                .map(|f| Predicate::field(*f, Condition::Matches(pattern.clone()))),
        ),
        Err(e) => warn!(error = %e, "search token does not compile; text fields skipped"),
    }
    if let Some(n) = numeric_token(token) {
        disjuncts.extend(
            NUMERIC_SEARCH_FIELDS
                .iter()
                .map(|f| Predicate::field(*f, Condition::Eq(n.clone()))),
        );
    }

    // a non-blank token with no disjuncts left is an empty `Or`: no rows
    Predicate::Or(disjuncts)
}

/// Both non-universal: conjunction. Otherwise whichever one restricts.
pub fn combine(filter: Predicate, search: Predicate) -> Predicate {
    filter.and(search)
}

/// Store-native rendering cut to a log-friendly length.
pub fn render_for_log(predicate: &Predicate) -> String {
    let rendered = predicate.to_native().to_string();
    match rendered.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &rendered[..cut]),
        None => rendered,
    }
}

/// The token reduced to its digits, as an integer when it fits and as a
/// float otherwise.
fn numeric_token(token: &str) -> Option<Value> {
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    match digits.parse::<i64>() {
        Ok(n) => Some(Value::from(n)),
        Err(_) => digits
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
    }
}

fn match_nothing() -> Predicate {
    Predicate::Or(Vec::new())
}

fn push_in(parts: &mut Vec<Predicate>, field: &str, values: &[String]) {
    let values: Vec<Value> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(Value::from)
        .collect();
    if !values.is_empty() {
        parts.push(Predicate::field(field, Condition::In(values)));
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
