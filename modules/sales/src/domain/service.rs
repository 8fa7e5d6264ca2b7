use std::sync::Arc;

use docstore::DocumentStore;
use tracing::{debug, instrument};

use crate::contract::model::{FilterOptions, PageRequest, RangePage, RangeRequest, SalesPage};
use crate::domain::error::DomainError;
use crate::domain::filter_options::FilterOptionsCache;
use crate::domain::pagination::{Budgets, PaginationStrategist, Thresholds};
use crate::domain::predicate::{
    build_filter_predicate, build_search_predicate, combine, render_for_log,
};

/// Domain service for browsing sales.
/// Depends only on the store port and the injected filter-options cache.
pub struct Service {
    strategist: PaginationStrategist,
    filter_options: Arc<FilterOptionsCache>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 1000,
        }
    }
}

impl Service {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        filter_options: Arc<FilterOptionsCache>,
        thresholds: Thresholds,
        budgets: Budgets,
        config: ServiceConfig,
    ) -> Self {
        Self {
            strategist: PaginationStrategist::new(store, thresholds, budgets),
            filter_options,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn strategist(&self) -> &PaginationStrategist {
        &self.strategist
    }

    #[instrument(
        name = "sales.service.get_page",
        skip(self, request),
        fields(page = request.page, page_size = request.page_size, path = ?request.path)
    )]
    pub async fn get_page(&self, mut request: PageRequest) -> Result<SalesPage, DomainError> {
        request.page_size = self.clamp_page_size(request.page_size);

        let predicate = combine(
            build_filter_predicate(&request.filter),
            build_search_predicate(&request.search),
        );
        debug!(predicate = %render_for_log(&predicate), sort = ?request.sort_key, "query composed");

        let page = self.strategist.get_page(&predicate, &request).await?;
        debug!(
            returned = page.records.len(),
            total = page.pagination.total_records,
            "page served"
        );
        Ok(page)
    }

    #[instrument(
        name = "sales.service.get_range",
        skip(self, request),
        fields(last_id = ?request.last_id, page_size = request.page_size)
    )]
    pub async fn get_range(&self, mut request: RangeRequest) -> Result<RangePage, DomainError> {
        request.page_size = self.clamp_page_size(request.page_size);

        let predicate = build_filter_predicate(&request.filter);
        debug!(predicate = %render_for_log(&predicate), "range query composed");

        self.strategist.get_range(&predicate, &request).await
    }

    #[instrument(name = "sales.service.filter_options", skip(self))]
    pub async fn filter_options(&self) -> Arc<FilterOptions> {
        self.filter_options.get().await
    }

    #[instrument(name = "sales.service.refresh_filter_options", skip(self))]
    pub async fn refresh_filter_options(&self) -> Arc<FilterOptions> {
        self.filter_options.force_refresh().await
    }

    fn clamp_page_size(&self, requested: u64) -> u64 {
        match requested {
            0 => self.config.default_page_size,
            n => n.min(self.config.max_page_size),
        }
    }
}
