mod common;

use std::sync::Arc;

use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{synthetic_store, FaultyStore};
use docstore::DocumentStore;
use sales::config::SalesConfig;
use sales::SalesModule;
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

fn app_over(store: Arc<dyn DocumentStore>) -> Router {
    let module = SalesModule::new();
    module.init(&SalesConfig::default(), store).unwrap();
    ApiIngress::new(ApiIngressConfig::default())
        .mount(&module)
        .unwrap()
        .build_router()
}

fn app(records: u64) -> Router {
    app_over(Arc::new(synthetic_store(records)))
}

async fn call(router: Router, method: Method, uri: &str) -> (StatusCode, Option<String>, Value) {
    let resp = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, content_type, serde_json::from_slice(&body).unwrap())
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = call(router, Method::GET, uri).await;
    (status, body)
}

fn data_ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn lists_the_newest_records_first() {
    let (status, body) = get(app(500), "/api/sales?limit=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data_ids(&body), vec![500, 499, 498, 497, 496]);
    let p = &body["pagination"];
    assert_eq!(p["currentPage"], 1);
    assert_eq!(p["totalPages"], 100);
    assert_eq!(p["totalRecords"], 500);
    assert_eq!(p["pageSize"], 5);
    assert_eq!(p["hasNextPage"], true);
    assert_eq!(p["hasPreviousPage"], false);

    let first = &body["data"][0];
    assert!(first["customerName"].is_string());
    assert!(first["customerRegion"].is_string());
    assert!(first.get("Customer Name").is_none());
}

#[tokio::test]
async fn malformed_parameters_use_defaults() {
    let (status, body) = get(app(50), "/api/sales?page=abc&limit=xyz&minAge=old").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["pageSize"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn oversized_limit_is_capped() {
    let (_, body) = get(app(1_500), "/api/sales?limit=99999").await;
    assert_eq!(body["pagination"]["pageSize"], 1000);
    assert_eq!(body["data"].as_array().unwrap().len(), 1000);
}

#[tokio::test]
async fn page_beyond_the_end_is_an_empty_last_page() {
    let (status, body) = get(app(95), "/api/sales?page=40").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["currentPage"], 10);
    assert_eq!(body["pagination"]["hasNextPage"], false);
    assert_eq!(body["pagination"]["hasPreviousPage"], true);
}

#[tokio::test]
async fn facets_and_search_narrow_the_result() {
    let (_, body) = get(
        app(400),
        "/api/sales?limit=1000&customerRegion=North,East&gender=Female&sortOrder=asc",
    )
    .await;

    let rows = body["data"].as_array().unwrap();
    assert!(!rows.is_empty());
    assert_eq!(body["pagination"]["totalRecords"], rows.len() as u64);
    for r in rows {
        assert!(matches!(r["customerRegion"].as_str(), Some("North" | "East")));
        assert_eq!(r["gender"], "Female");
    }
    let ids = data_ids(&body);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let (_, body) = get(app(400), "/api/sales?limit=1000&search=42").await;
    assert!(data_ids(&body).contains(&42));
}

#[tokio::test]
async fn optimized_route_serves_the_same_shape() {
    let (status, body) = get(app(60), "/api/sales/optimized?limit=3&sortOrder=ASC").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data_ids(&body), vec![1, 2, 3]);
    assert_eq!(body["pagination"]["totalPages"], 20);
}

#[tokio::test]
async fn range_route_returns_the_next_cursor() {
    let (status, body) = get(app(100), "/api/sales/range?lastId=10&limit=5&sortOrder=asc").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data_ids(&body), vec![11, 12, 13, 14, 15]);
    assert_eq!(body["lastId"], 15);
    assert_eq!(body["totalRecords"], 100);

    let (_, body) = get(app(100), "/api/sales/range?lastId=1&limit=5").await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert!(body["lastId"].is_null());
}

#[tokio::test]
async fn filter_options_and_refresh() {
    let router = app(300);

    let (status, body) = get(router.clone(), "/api/sales/filters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genders"], serde_json::json!(["Female", "Male"]));
    assert!(body["ageRange"]["min"].as_i64().unwrap() >= 18);
    assert!(body["tags"].as_array().unwrap().len() <= 100);

    let (status, _, refreshed) = call(router, Method::POST, "/api/sales/filters/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed, body);
}

#[tokio::test]
async fn store_outage_is_a_generic_problem() {
    let inner: Arc<dyn DocumentStore> = Arc::new(synthetic_store(10));
    let store = Arc::new(FaultyStore::new(inner));
    FaultyStore::set(&store.down, true);
    let router = app_over(store);

    let (status, content_type, body) = call(router.clone(), Method::GET, "/api/sales").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    assert_eq!(body["code"], "SALES_UNAVAILABLE");
    assert_eq!(body["instance"], "/api/sales");
    assert!(!body["detail"].as_str().unwrap().contains("connection refused"));

    // facet metadata degrades to empty lists instead
    let (status, body) = get(router, "/api/sales/filters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customerRegions"], serde_json::json!([]));
    assert_eq!(body["ageRange"], serde_json::json!({ "min": 0, "max": 100 }));
}

#[tokio::test]
async fn index_lists_the_sales_operations() {
    let (status, body) = get(app(1), "/").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["operationId"].as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "sales.list",
            "sales.list_optimized",
            "sales.list_range",
            "sales.filter_options",
            "sales.refresh_filter_options"
        ]
    );
}

#[test]
fn routes_need_an_initialized_service() {
    let module = SalesModule::new();
    let res = ApiIngress::new(ApiIngressConfig::default()).mount(&module);
    assert!(res.is_err());
}
