//! Maps stored documents onto [`SaleRecord`].
//!
//! One table pairs every response name with its source field. Plain finds are
//! read by source name; aggregated windows are reshaped by the `Project` stage
//! built from the same table and then read by response name.

use query_core::{Document, Projection, Stage, Value};

use crate::contract::model::SaleRecord;
use crate::domain::fields;

#[derive(Debug, Clone, Copy)]
struct Column {
    output: &'static str,
    source: &'static str,
}

const fn col(output: &'static str, source: &'static str) -> Column {
    Column { output, source }
}

const ID: Column = col("id", fields::TRANSACTION_ID);
const DATE: Column = col("date", fields::DATE);
const CUSTOMER_ID: Column = col("customerId", fields::CUSTOMER_ID);
const CUSTOMER_NAME: Column = col("customerName", fields::CUSTOMER_NAME);
const PHONE_NUMBER: Column = col("phoneNumber", fields::PHONE_NUMBER);
const GENDER: Column = col("gender", fields::GENDER);
const AGE: Column = col("age", fields::AGE);
const CUSTOMER_REGION: Column = col("customerRegion", fields::CUSTOMER_REGION);
const PRODUCT_CATEGORY: Column = col("productCategory", fields::PRODUCT_CATEGORY);
const QUANTITY: Column = col("quantity", fields::QUANTITY);
const TOTAL_AMOUNT: Column = col("totalAmount", fields::TOTAL_AMOUNT);
const PRODUCT_ID: Column = col("productId", fields::PRODUCT_ID);
const EMPLOYEE_NAME: Column = col("employeeName", fields::EMPLOYEE_NAME);
const PAYMENT_METHOD: Column = col("paymentMethod", fields::PAYMENT_METHOD);
const TAGS: Column = col("tags", fields::TAGS);

const COLUMNS: [Column; 15] = [
    ID,
    DATE,
    CUSTOMER_ID,
    CUSTOMER_NAME,
    PHONE_NUMBER,
    GENDER,
    AGE,
    CUSTOMER_REGION,
    PRODUCT_CATEGORY,
    QUANTITY,
    TOTAL_AMOUNT,
    PRODUCT_ID,
    EMPLOYEE_NAME,
    PAYMENT_METHOD,
    TAGS,
];

/// Record from a raw document (source field names).
pub fn project(doc: &Document) -> SaleRecord {
    build(|c| doc.get(c.source))
}

/// Record from a row already reshaped by [`projection_stage`].
pub fn project_window_row(row: &Document) -> SaleRecord {
    build(|c| row.get(c.output))
}

/// Pipeline stage renaming source fields to response names.
pub fn projection_stage() -> Stage {
    Stage::Project(
        COLUMNS
            .iter()
            .map(|c| Projection::new(c.output, c.source))
            .collect(),
    )
}

fn build<'a>(get: impl Fn(&Column) -> Option<&'a Value>) -> SaleRecord {
    SaleRecord {
        id: get(&ID).and_then(as_int),
        date: get(&DATE).and_then(as_text),
        customer_id: get(&CUSTOMER_ID).and_then(as_text),
        customer_name: get(&CUSTOMER_NAME).and_then(as_text),
        phone_number: get(&PHONE_NUMBER).and_then(as_text),
        gender: get(&GENDER).and_then(as_text),
        age: get(&AGE).and_then(as_int),
        customer_region: get(&CUSTOMER_REGION).and_then(as_text),
        product_category: get(&PRODUCT_CATEGORY).and_then(as_text),
        quantity: get(&QUANTITY).and_then(as_int),
        total_amount: get(&TOTAL_AMOUNT).and_then(Value::as_f64),
        product_id: get(&PRODUCT_ID).and_then(as_text),
        employee_name: get(&EMPLOYEE_NAME).and_then(as_text),
        payment_method: get(&PAYMENT_METHOD).and_then(as_text),
        tags: get(&TAGS).and_then(as_text),
    }
}

/// Integers, including floats with no fractional part.
pub(crate) fn as_int(v: &Value) -> Option<i64> {
    if let Some(i) = v.as_i64() {
        return Some(i);
    }
    let f = v.as_f64()?;
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
}

/// Strings as-is; numbers (phone numbers, numeric ids) in decimal.
fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) => match as_int(v) {
            Some(i) => Some(i.to_string()),
            None => Some(v.to_string()),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(v: Value) -> Document {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn raw_document_is_read_by_source_name() {
        let d = doc(json!({
            "Transaction ID": 17,
            "Date": "2023-04-01",
            "Customer Name": "Neha Yadav",
            "Phone Number": 9720432701u64,
            "Age": 31.0,
            "Quantity": 3,
            "Total Amount": 1498.5,
            "Tags": "organic,fresh",
            "Brand": "ignored"
        }));
        let r = project(&d);
        assert_eq!(r.id, Some(17));
        assert_eq!(r.date.as_deref(), Some("2023-04-01"));
        assert_eq!(r.phone_number.as_deref(), Some("9720432701"));
        assert_eq!(r.age, Some(31));
        assert_eq!(r.total_amount, Some(1498.5));
        assert_eq!(r.tags.as_deref(), Some("organic,fresh"));
        assert_eq!(r.gender, None);
    }

    #[test]
    fn fractional_values_are_not_integers() {
        let d = doc(json!({ "Transaction ID": 1.5, "Age": "thirty" }));
        let r = project(&d);
        assert_eq!(r.id, None);
        assert_eq!(r.age, None);
    }

    #[test]
    fn projection_stage_covers_every_column() {
        let Stage::Project(cols) = projection_stage() else {
            panic!("expected a projection");
        };
        assert_eq!(cols.len(), COLUMNS.len());
        assert!(cols.contains(&Projection::new("customerRegion", "Customer Region")));
    }

    #[test]
    fn window_rows_match_direct_projection() {
        let raw = doc(json!({
            "Transaction ID": 5,
            "Customer Region": "North",
            "Payment Method": "UPI",
            "Employee Name": "Ravi"
        }));
        let reshaped: Document = COLUMNS
            .iter()
            .filter_map(|c| raw.get(c.source).map(|v| (c.output.to_string(), v.clone())))
            .collect();
        assert_eq!(project_window_row(&reshaped), project(&raw));
    }
}
