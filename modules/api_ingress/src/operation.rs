//! Route registration with a catalog of documented operations.
//!
//! Modules describe each endpoint once through [`OperationBuilder`]; the
//! builder attaches the handler to the router and records the operation in a
//! [`RouteCatalog`], which rejects duplicate paths and operation ids and
//! feeds the service index.

use std::collections::HashSet;

use anyhow::{bail, Result};
use axum::handler::Handler;
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::Router;
use serde::Serialize;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueryParam {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    pub method: &'static str,
    pub path: String,
    pub operation_id: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query_params: Vec<QueryParam>,
}

#[derive(Debug, Default)]
pub struct RouteCatalog {
    operations: Vec<OperationSpec>,
    seen_routes: HashSet<(&'static str, String)>,
    seen_ids: HashSet<String>,
}

impl RouteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: OperationSpec) -> Result<()> {
        if !self.seen_routes.insert((spec.method, spec.path.clone())) {
            bail!("duplicate route {} {}", spec.method, spec.path);
        }
        if !self.seen_ids.insert(spec.operation_id.clone()) {
            bail!("duplicate operation id '{}'", spec.operation_id);
        }
        tracing::debug!(method = spec.method, path = %spec.path, id = %spec.operation_id, "route registered");
        self.operations.push(spec);
        Ok(())
    }

    pub fn operations(&self) -> &[OperationSpec] {
        &self.operations
    }
}

pub struct OperationBuilder<S = ()> {
    method: &'static str,
    filter: MethodFilter,
    path: String,
    operation_id: Option<String>,
    summary: String,
    query_params: Vec<QueryParam>,
    handler: Option<MethodRouter<S>>,
}

impl<S> OperationBuilder<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn new(method: &'static str, filter: MethodFilter, path: impl Into<String>) -> Self {
        Self {
            method,
            filter,
            path: path.into(),
            operation_id: None,
            summary: String::new(),
            query_params: Vec::new(),
            handler: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", MethodFilter::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", MethodFilter::POST, path)
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.summary = text.into();
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.query_params.push(QueryParam {
            name: name.into(),
            description: description.into(),
        });
        self
    }

    pub fn handler<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.handler = Some(on(self.filter, handler));
        self
    }

    /// Attach the handler to `router` and record the operation.
    pub fn register(self, router: Router<S>, catalog: &mut RouteCatalog) -> Result<Router<S>> {
        let Some(method_router) = self.handler else {
            bail!("{} {} has no handler", self.method, self.path);
        };
        let operation_id = self
            .operation_id
            .unwrap_or_else(|| format!("{}:{}", self.method.to_ascii_lowercase(), self.path));

        catalog.register(OperationSpec {
            method: self.method,
            path: self.path.clone(),
            operation_id,
            summary: self.summary,
            query_params: self.query_params,
        })?;
        Ok(router.route(&self.path, method_router))
    }
}
