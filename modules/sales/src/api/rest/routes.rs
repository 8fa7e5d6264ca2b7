use std::sync::Arc;

use api_ingress::{OperationBuilder, RouteCatalog};
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

const PAGE_PARAMS: [(&str, &str); 14] = [
    ("page", "1-based page number (default 1)"),
    ("limit", "Page size (default 10, capped by configuration)"),
    ("search", "Free-text search over names and identifiers"),
    ("sortBy", "id, date, quantity, customerName, customerId, totalAmount, age, gender, productCategory, customerRegion, productId, employeeName"),
    ("sortOrder", "asc or desc (default desc)"),
    ("customerRegion", "Comma-separated regions"),
    ("gender", "Comma-separated genders"),
    ("productCategory", "Comma-separated categories"),
    ("tags", "Comma-separated tags, matched case-insensitively"),
    ("paymentMethod", "Comma-separated payment methods"),
    ("minAge", "Inclusive lower age bound"),
    ("maxAge", "Inclusive upper age bound"),
    ("startDate", "Inclusive start date (YYYY-MM-DD)"),
    ("endDate", "Inclusive end date (YYYY-MM-DD)"),
];

fn with_page_params(mut op: OperationBuilder) -> OperationBuilder {
    for (name, description) in PAGE_PARAMS {
        op = op.query_param(name, description);
    }
    op
}

pub fn register_routes(
    mut router: Router,
    catalog: &mut RouteCatalog,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    // GET /api/sales - standard pagination
    router = with_page_params(
        OperationBuilder::get("/api/sales")
            .operation_id("sales.list")
            .summary("List sales with filters, search and sorting"),
    )
    .handler(handlers::list_sales)
    .register(router, catalog)?;

    // GET /api/sales/optimized - deep pages via aggregation
    router = with_page_params(
        OperationBuilder::get("/api/sales/optimized")
            .operation_id("sales.list_optimized")
            .summary("List sales, aggregating deep pages in one pipeline"),
    )
    .handler(handlers::list_sales_optimized)
    .register(router, catalog)?;

    // GET /api/sales/range - cursor pagination
    router = OperationBuilder::get("/api/sales/range")
        .operation_id("sales.list_range")
        .summary("List sales after a transaction id cursor")
        .query_param("lastId", "Transaction id of the last record already seen")
        .query_param("limit", "Page size")
        .query_param("sortOrder", "asc or desc (default desc)")
        .query_param("customerRegion", "Comma-separated regions")
        .query_param("gender", "Comma-separated genders")
        .query_param("productCategory", "Comma-separated categories")
        .query_param("minAge", "Inclusive lower age bound")
        .query_param("maxAge", "Inclusive upper age bound")
        .handler(handlers::list_sales_range)
        .register(router, catalog)?;

    // GET /api/sales/filters - cached facet values
    router = OperationBuilder::get("/api/sales/filters")
        .operation_id("sales.filter_options")
        .summary("Distinct facet values, tag vocabulary and age range")
        .handler(handlers::get_filter_options)
        .register(router, catalog)?;

    // POST /api/sales/filters/refresh - rebuild the cache now
    router = OperationBuilder::post("/api/sales/filters/refresh")
        .operation_id("sales.refresh_filter_options")
        .summary("Rebuild the filter options cache")
        .handler(handlers::refresh_filter_options)
        .register(router, catalog)?;

    router = router.layer(Extension(service));

    Ok(router)
}
