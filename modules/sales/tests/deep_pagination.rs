//! Page scenarios over a 700k-record collection.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{ids, service_over, SequentialStore};
use sales::config::SalesConfig;
use sales::contract::model::{PageRequest, PaginationPath, SortOrder};
use sales::domain::service::Service;

const RECORDS: u64 = 700_000;

fn setup() -> (Arc<SequentialStore>, Service) {
    let store = Arc::new(SequentialStore::new(RECORDS));
    let service = service_over(store.clone(), &SalesConfig::default());
    (store, service)
}

fn page(page: u64, path: PaginationPath) -> PageRequest {
    PageRequest {
        page,
        page_size: 10,
        path,
        ..PageRequest::default()
    }
}

fn expected_desc(offset: u64, n: u64) -> Vec<i64> {
    (0..n).map(|i| (RECORDS - offset - i) as i64).collect()
}

#[tokio::test]
async fn first_page_uses_the_estimated_total() {
    let (store, service) = setup();

    let result = service.get_page(page(1, PaginationPath::Standard)).await.unwrap();

    assert_eq!(ids(&result.records), expected_desc(0, 10));
    let meta = result.pagination;
    assert_eq!(meta.total_records, RECORDS);
    assert_eq!(meta.total_pages, 70_000);
    assert_eq!(meta.current_page, 1);
    assert!(meta.has_next_page);
    assert!(!meta.has_previous_page);

    // no filter, so no exact count
    assert_eq!(store.counts.load(Ordering::SeqCst), 0);
    assert_eq!(store.estimates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn page_past_the_end_is_empty_and_clamped() {
    let (store, service) = setup();

    let result = service
        .get_page(page(999_999, PaginationPath::Standard))
        .await
        .unwrap();

    assert!(result.records.is_empty());
    let meta = result.pagination;
    assert_eq!(meta.current_page, 70_000);
    assert_eq!(meta.total_pages, 70_000);
    assert!(!meta.has_next_page);
    assert!(meta.has_previous_page);
    assert_eq!(store.finds.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn standard_mid_depth_uses_an_anchor() {
    let (store, service) = setup();

    // offset 150_000
    let result = service
        .get_page(page(15_001, PaginationPath::Standard))
        .await
        .unwrap();

    assert_eq!(ids(&result.records), expected_desc(150_000, 10));
    assert_eq!(store.finds.load(Ordering::SeqCst), 2);
    assert_eq!(store.aggregates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn optimized_mid_depth_aggregates() {
    let (store, service) = setup();

    let result = service
        .get_page(page(15_001, PaginationPath::Optimized))
        .await
        .unwrap();

    assert_eq!(ids(&result.records), expected_desc(150_000, 10));
    assert_eq!(store.finds.load(Ordering::SeqCst), 0);
    assert_eq!(store.aggregates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn standard_deep_page_aggregates() {
    let (store, service) = setup();

    // offset 600_000
    let result = service
        .get_page(page(60_001, PaginationPath::Standard))
        .await
        .unwrap();

    assert_eq!(ids(&result.records), expected_desc(600_000, 10));
    assert_eq!(store.aggregates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn last_page_has_the_lowest_ids() {
    let (_, service) = setup();

    let result = service
        .get_page(page(70_000, PaginationPath::Standard))
        .await
        .unwrap();

    assert_eq!(ids(&result.records), (1..=10).rev().collect::<Vec<i64>>());
    assert!(!result.pagination.has_next_page);
}

#[tokio::test]
async fn ascending_deep_pages_agree_across_paths() {
    let (_, service) = setup();

    for p in [10_001, 10_002, 40_000, 50_001, 55_555] {
        let mut standard = page(p, PaginationPath::Standard);
        standard.sort_order = SortOrder::Asc;
        let mut optimized = standard.clone();
        optimized.path = PaginationPath::Optimized;

        let a = service.get_page(standard).await.unwrap();
        let b = service.get_page(optimized).await.unwrap();

        let first = (p - 1) * 10 + 1;
        assert_eq!(ids(&a.records), (first..first + 10).map(|i| i as i64).collect::<Vec<_>>());
        assert_eq!(a, b, "page {p}");
    }
}
