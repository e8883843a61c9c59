// ABOUTME: Request tracing spans and response security headers for every HTTP request
// ABOUTME: Builds the TraceLayer span with a request ID and stamps the configured security headers

use crate::resources::ServerResources;
use crate::utils::client_ip::extract_client_ip;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use tracing::Span;
use uuid::Uuid;

/// Header carrying the request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create a tracing span for an HTTP request
///
/// Used as the `make_span_with` hook of `tower_http::trace::TraceLayer`.
pub fn create_request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map_or_else(|| format!("req_{}", Uuid::new_v4().simple()), str::to_owned);

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        client_ip = %extract_client_ip(request.headers()),
        request_id = %request_id,
        status_code = tracing::field::Empty,
    )
}

/// Stamp the security headers onto every response
pub async fn apply_security_headers(
    State(resources): State<Arc<ServerResources>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    Span::current().record("status_code", response.status().as_u16());

    let headers = response.headers_mut();
    for (name, value) in resources.security_headers.header_pairs() {
        headers.entry(name).or_insert(value);
    }
    response
}
