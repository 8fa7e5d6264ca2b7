use std::sync::Arc;

use anyhow::anyhow;
use api_ingress::{RestfulModule, RouteCatalog};
use arc_swap::ArcSwapOption;
use docstore::DocumentStore;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::SalesConfig;
use crate::contract::client::SalesApi;
use crate::domain::filter_options::FilterOptionsCache;
use crate::domain::service::Service;
use crate::gateways::local::SalesLocalClient;

/// Sales module: owns the domain service and exposes it over REST and as
/// an in-process [`SalesApi`] client.
#[derive(Default)]
pub struct SalesModule {
    // Keep the domain service behind ArcSwap for cheap read-mostly access.
    service: ArcSwapOption<Service>,
}

impl SalesModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the store into the domain service. The filter-options cache is
    /// created here and shared with the service.
    pub fn init(&self, cfg: &SalesConfig, store: Arc<dyn DocumentStore>) -> anyhow::Result<()> {
        info!("Initializing sales module");
        debug!(
            "Loaded sales config: default_page_size={}, max_page_size={}, thresholds={:?}",
            cfg.default_page_size,
            cfg.max_page_size,
            cfg.thresholds()
        );

        let filter_options = Arc::new(FilterOptionsCache::new(
            store.clone(),
            cfg.filter_options_settings(),
        ));
        let service = Service::new(
            store,
            filter_options,
            cfg.thresholds(),
            cfg.budgets(),
            cfg.service_config(),
        );
        self.service.store(Some(Arc::new(service)));
        Ok(())
    }

    pub fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow!("Service not initialized"))
    }

    /// Local in-process client for other modules.
    pub fn client(&self) -> anyhow::Result<Arc<dyn SalesApi>> {
        Ok(Arc::new(SalesLocalClient::new(self.service()?)))
    }

    /// Populate the filter-options cache before traffic arrives.
    pub async fn warm_up(&self) -> anyhow::Result<()> {
        let options = self.service()?.filter_options().await;
        info!(
            regions = options.customer_regions.len(),
            categories = options.product_categories.len(),
            tags = options.tags.len(),
            "Filter options warmed up"
        );
        Ok(())
    }
}

impl RestfulModule for SalesModule {
    fn name(&self) -> &'static str {
        "sales"
    }

    fn register_rest(
        &self,
        router: axum::Router,
        catalog: &mut RouteCatalog,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering sales REST routes");
        let router = routes::register_routes(router, catalog, self.service()?)?;
        info!("Sales REST routes registered successfully");
        Ok(router)
    }
}
