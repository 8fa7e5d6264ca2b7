use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::{
    error::SalesError,
    model::{FilterOptions, PageRequest, RangePage, RangeRequest, SalesPage},
};

/// Public API trait for the sales module that other modules can use
#[async_trait]
pub trait SalesApi: Send + Sync {
    /// One page of transactions with pagination metadata.
    async fn get_page(&self, request: PageRequest) -> Result<SalesPage, SalesError>;

    /// Cursor-based slice following `request.last_id`.
    async fn get_range(&self, request: RangeRequest) -> Result<RangePage, SalesError>;

    /// Facet values, possibly stale by up to the cache TTL. Never fails.
    async fn filter_options(&self) -> Arc<FilterOptions>;

    async fn refresh_filter_options(&self) -> Arc<FilterOptions>;
}
