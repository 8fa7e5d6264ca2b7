//! Deterministic synthetic sales dataset for `--mock` runs and tests.

use chrono::{Duration as Days, NaiveDate};
use docstore::{MemoryStore, MemoryStoreOptions};
use query_core::{Document, Value};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::domain::fields;

const REGIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];
const GENDERS: [&str; 2] = ["Male", "Female"];
const PAYMENT_METHODS: [&str; 6] = [
    "Cash",
    "Credit Card",
    "Debit Card",
    "UPI",
    "Net Banking",
    "Wallet",
];
const CUSTOMER_TYPES: [&str; 3] = ["New", "Returning", "Loyal"];
const FIRST_NAMES: [&str; 12] = [
    "Aarav", "Neha", "Rohan", "Priya", "Vikram", "Ananya", "Kabir", "Isha", "Arjun", "Meera",
    "Dev", "Sana",
];
const LAST_NAMES: [&str; 8] = [
    "Sharma", "Yadav", "Patel", "Gupta", "Reddy", "Iyer", "Khan", "Singh",
];
const EMPLOYEES: [&str; 6] = [
    "Harsh Agrawal",
    "Ravi Kumar",
    "Pooja Mehta",
    "Suresh Nair",
    "Anita Das",
    "Farhan Ali",
];

/// (category, brands, product names, tag pool)
const CATALOG: [(&str, [&str; 3], [&str; 3], [&str; 5]); 3] = [
    (
        "Electronics",
        ["Voltix", "Nexa", "Sonique"],
        ["Headphones", "Smartwatch", "Power Bank"],
        ["wireless", "gadgets", "smart", "portable", "accessories"],
    ),
    (
        "Clothing",
        ["UrbanWeave", "Threadline", "Kalaa"],
        ["T-Shirt", "Jeans", "Kurta"],
        ["cotton", "casual", "fashion", "formal", "summer"],
    ),
    (
        "Beauty",
        ["Glowra", "PureLeaf", "Velvet"],
        ["Face Wash", "Lipstick", "Serum"],
        ["organic", "skincare", "makeup", "fragrance-free", "vegan"],
    ),
];

/// `count` records with identifiers `1..=count`, reproducible for a seed.
pub fn generate(count: u64, seed: u64) -> Vec<Document> {
    let mut rng = StdRng::seed_from_u64(seed);
    let epoch = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default();
    (1..=count).map(|id| record(&mut rng, id, epoch)).collect()
}

/// Synthetic dataset wrapped in a [`MemoryStore`].
pub fn memory_store(
    collection: &str,
    count: u64,
    seed: u64,
    options: MemoryStoreOptions,
) -> MemoryStore {
    let docs = generate(count, seed);
    info!(collection, records = docs.len(), seed, "synthetic dataset generated");
    MemoryStore::new(collection, docs, options)
}

fn record(rng: &mut StdRng, id: u64, epoch: NaiveDate) -> Document {
    let (category, brands, products, tag_pool) = CATALOG[rng.gen_range(0..CATALOG.len())];
    let customer = rng.gen_range(1..=20_000u32);
    let first = pick(rng, &FIRST_NAMES);
    let last = pick(rng, &LAST_NAMES);
    let quantity: i64 = rng.gen_range(1..=10);
    let unit_price: i64 = rng.gen_range(50..=5_000);
    let discount: i64 = *[0, 5, 10, 15, 20].choose(rng).unwrap_or(&0);
    let total = quantity * unit_price;
    let date = epoch + Days::days(rng.gen_range(0..1_095));

    let tag_count = rng.gen_range(1..=3);
    let tags: Vec<&str> = tag_pool.choose_multiple(rng, tag_count).copied().collect();

    let mut doc = Document::new();
    let mut put = |field: &str, value: Value| {
        doc.insert(field.to_string(), value);
    };
    put(fields::TRANSACTION_ID, Value::from(id));
    put(fields::DATE, Value::from(date.format("%Y-%m-%d").to_string()));
    put(fields::CUSTOMER_ID, Value::from(format!("CUST{customer:05}")));
    put(fields::CUSTOMER_NAME, Value::from(format!("{first} {last}")));
    put(
        fields::PHONE_NUMBER,
        Value::from(rng.gen_range(6_000_000_000u64..10_000_000_000)),
    );
    put(fields::GENDER, Value::from(pick(rng, &GENDERS)));
    put(fields::AGE, Value::from(rng.gen_range(18..=65u32)));
    put(fields::CUSTOMER_REGION, Value::from(pick(rng, &REGIONS)));
    put("Customer Type", Value::from(pick(rng, &CUSTOMER_TYPES)));
    put(fields::PRODUCT_CATEGORY, Value::from(category));
    put(
        fields::PRODUCT_ID,
        Value::from(format!("PROD{:04}", rng.gen_range(1..=2_000u32))),
    );
    put(fields::PRODUCT_NAME, Value::from(pick(rng, &products)));
    put(fields::BRAND, Value::from(pick(rng, &brands)));
    put(fields::QUANTITY, Value::from(quantity));
    put(fields::PRICE_PER_UNIT, Value::from(unit_price));
    put("Discount Percentage", Value::from(discount));
    put(fields::TOTAL_AMOUNT, Value::from(total));
    put(
        "Final Amount",
        Value::from(total as f64 * (100 - discount) as f64 / 100.0),
    );
    put(fields::PAYMENT_METHOD, Value::from(pick(rng, &PAYMENT_METHODS)));
    put(fields::EMPLOYEE_NAME, Value::from(pick(rng, &EMPLOYEES)));
    put(fields::TAGS, Value::from(tags.join(",")));
    doc
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}
