use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::{
    client::SalesApi,
    error::SalesError,
    model::{FilterOptions, PageRequest, RangePage, RangeRequest, SalesPage},
};
use crate::domain::service::Service;

/// Local implementation of the SalesApi trait that delegates to the domain service
pub struct SalesLocalClient {
    service: Arc<Service>,
}

impl SalesLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SalesApi for SalesLocalClient {
    async fn get_page(&self, request: PageRequest) -> Result<SalesPage, SalesError> {
        self.service.get_page(request).await.map_err(Into::into)
    }

    async fn get_range(&self, request: RangeRequest) -> Result<RangePage, SalesError> {
        self.service.get_range(request).await.map_err(Into::into)
    }

    async fn filter_options(&self) -> Arc<FilterOptions> {
        self.service.filter_options().await
    }

    async fn refresh_filter_options(&self) -> Arc<FilterOptions> {
        self.service.refresh_filter_options().await
    }
}
