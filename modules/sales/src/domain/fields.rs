//! Source field names of the sales collection.

use crate::contract::model::SortKey;

pub const TRANSACTION_ID: &str = "Transaction ID";
pub const DATE: &str = "Date";
pub const CUSTOMER_ID: &str = "Customer ID";
pub const CUSTOMER_NAME: &str = "Customer Name";
pub const PHONE_NUMBER: &str = "Phone Number";
pub const GENDER: &str = "Gender";
pub const AGE: &str = "Age";
pub const CUSTOMER_REGION: &str = "Customer Region";
pub const PRODUCT_CATEGORY: &str = "Product Category";
pub const QUANTITY: &str = "Quantity";
pub const PRICE_PER_UNIT: &str = "Price per Unit";
pub const TOTAL_AMOUNT: &str = "Total Amount";
pub const PRODUCT_ID: &str = "Product ID";
pub const PRODUCT_NAME: &str = "Product Name";
pub const BRAND: &str = "Brand";
pub const EMPLOYEE_NAME: &str = "Employee Name";
pub const PAYMENT_METHOD: &str = "Payment Method";
pub const TAGS: &str = "Tags";

/// Source field a sort key orders by.
pub fn sort_field(key: SortKey) -> &'static str {
    match key {
        SortKey::Id => TRANSACTION_ID,
        SortKey::Date => DATE,
        SortKey::Quantity => QUANTITY,
        SortKey::CustomerName => CUSTOMER_NAME,
        SortKey::CustomerId => CUSTOMER_ID,
        SortKey::TotalAmount => TOTAL_AMOUNT,
        SortKey::Age => AGE,
        SortKey::Gender => GENDER,
        SortKey::ProductCategory => PRODUCT_CATEGORY,
        SortKey::CustomerRegion => CUSTOMER_REGION,
        SortKey::ProductId => PRODUCT_ID,
        SortKey::EmployeeName => EMPLOYEE_NAME,
    }
}
