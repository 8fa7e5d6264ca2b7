use api_ingress::problem::{Problem, ProblemResponse};
use axum::http::StatusCode;

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{code}"))
        .with_code(code)
        .with_instance(instance);

    // Correlate with the request span when one is active
    let problem = match tracing::Span::current().id() {
        Some(id) => problem.with_request_id(id.into_u64().to_string()),
        None => problem,
    };

    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse. Store details are logged,
/// never returned.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::StoreUnavailable { .. } => {
            tracing::error!(error = ?e, "Sales store unavailable");
            from_parts(
                StatusCode::SERVICE_UNAVAILABLE,
                "SALES_UNAVAILABLE",
                "Service unavailable",
                "Sales data is temporarily unavailable",
                instance,
            )
        }
        DomainError::QueryTimeout { .. } => {
            tracing::error!(error = ?e, "Sales query timed out");
            from_parts(
                StatusCode::SERVICE_UNAVAILABLE,
                "SALES_TIMEOUT",
                "Service unavailable",
                "The query took too long; try narrowing the filters",
                instance,
            )
        }
        DomainError::InvalidQuery { .. } => {
            tracing::error!(error = ?e, "Sales query rejected by the store");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SALES_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
