use std::sync::Arc;

use api_ingress::problem::ProblemResponse;
use axum::{extract::Query, http::Uri, response::Json, Extension};
use tracing::{error, info};

use crate::api::rest::dto::{FilterOptionsDto, RangePageDto, RangeQuery, SalesPageDto, SalesQuery};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::PaginationPath;
use crate::domain::service::Service;

/// Standard pagination ladder
pub async fn list_sales(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<SalesQuery>,
    uri: Uri,
) -> Result<Json<SalesPageDto>, ProblemResponse> {
    page(svc, query, PaginationPath::Standard, uri).await
}

/// Optimized ladder: deep pages go straight to the aggregated window
pub async fn list_sales_optimized(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<SalesQuery>,
    uri: Uri,
) -> Result<Json<SalesPageDto>, ProblemResponse> {
    page(svc, query, PaginationPath::Optimized, uri).await
}

async fn page(
    svc: Arc<Service>,
    query: SalesQuery,
    path: PaginationPath,
    uri: Uri,
) -> Result<Json<SalesPageDto>, ProblemResponse> {
    let request = query.into_request(path, svc.config());
    info!(page = request.page, limit = request.page_size, ?path, "Listing sales");

    match svc.get_page(request).await {
        Ok(page) => Ok(Json(page.into())),
        Err(e) => {
            error!("Failed to list sales: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_sales_range(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<RangeQuery>,
    uri: Uri,
) -> Result<Json<RangePageDto>, ProblemResponse> {
    let request = query.into_request(svc.config());
    info!(last_id = ?request.last_id, limit = request.page_size, "Listing sales range");

    match svc.get_range(request).await {
        Ok(range) => Ok(Json(range.into())),
        Err(e) => {
            error!("Failed to list sales range: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_filter_options(Extension(svc): Extension<Arc<Service>>) -> Json<FilterOptionsDto> {
    let options = svc.filter_options().await;
    Json(options.as_ref().into())
}

pub async fn refresh_filter_options(
    Extension(svc): Extension<Arc<Service>>,
) -> Json<FilterOptionsDto> {
    info!("Refreshing filter options on request");
    let options = svc.refresh_filter_options().await;
    Json(options.as_ref().into())
}
