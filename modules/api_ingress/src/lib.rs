//! HTTP host for the service: collects module routes, wraps them in the
//! shared middleware stack and serves them until shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Extension, Router};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod operation;
pub mod problem;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use operation::{OperationBuilder, OperationSpec, RouteCatalog};
pub use web::ServiceIndex;

/// A module that contributes REST routes to the host.
pub trait RestfulModule: Send + Sync {
    fn name(&self) -> &'static str;

    fn register_rest(&self, router: Router, catalog: &mut RouteCatalog) -> Result<Router>;
}

pub struct ApiIngress {
    config: ApiIngressConfig,
    service: String,
    version: String,
    api: Router,
    catalog: RouteCatalog,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            api: Router::new(),
            catalog: RouteCatalog::new(),
        }
    }

    /// Name and version reported by the index route.
    pub fn with_identity(mut self, service: impl Into<String>, version: impl Into<String>) -> Self {
        self.service = service.into();
        self.version = version.into();
        self
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    pub fn mount(mut self, module: &dyn RestfulModule) -> Result<Self> {
        let api = std::mem::take(&mut self.api);
        self.api = module
            .register_rest(api, &mut self.catalog)
            .with_context(|| format!("module '{}' failed to register routes", module.name()))?;
        tracing::info!(module = module.name(), "REST routes mounted");
        Ok(self)
    }

    pub fn operations(&self) -> &[OperationSpec] {
        self.catalog.operations()
    }

    /// Final router: module routes plus `/health` and `/`, wrapped (inner to
    /// outer) in body limit, timeout, CORS, request-id extension, tracing and
    /// request-id propagation.
    pub fn build_router(&self) -> Router {
        let index = Arc::new(ServiceIndex {
            service: self.service.clone(),
            version: self.version.clone(),
            endpoints: self.catalog.operations().to_vec(),
        });

        let mut router = self
            .api
            .clone()
            .route("/health", get(web::health_check))
            .route("/", get(web::service_index))
            .layer(Extension(index));

        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));
        if self.config.request_timeout_sec > 0 {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_sec,
            )));
        }
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = request_id::with_http_tracing(router);

        let x_request_id = request_id::header();
        router
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    pub async fn serve<F>(self, addr: &str, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = addr
            .parse()
            .with_context(|| format!("Invalid bind address '{addr}'"))?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        self.serve_listener(listener, shutdown).await
    }

    pub async fn serve_listener<F>(self, listener: tokio::net::TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        tracing::info!(addr = %listener.local_addr()?, routes = self.catalog.operations().len(), "HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .context("HTTP server failed")
    }
}
