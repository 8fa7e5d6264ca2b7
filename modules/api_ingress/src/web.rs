use std::sync::Arc;

use axum::{response::Json, Extension};
use serde::Serialize;
use serde_json::{json, Value};

use crate::operation::OperationSpec;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceIndex {
    pub service: String,
    pub version: String,
    pub endpoints: Vec<OperationSpec>,
}

pub async fn service_index(Extension(index): Extension<Arc<ServiceIndex>>) -> Json<ServiceIndex> {
    Json(index.as_ref().clone())
}
