//! Audit logging of mutations forwarded to the FHIR server

use axum::{body::Body, extract::Request, http::Method, middleware::Next, response::Response};

use super::request_id::RequestId;

/// Log every create, update and delete with its target and result
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    if !matches!(method, Method::POST | Method::PUT | Method::DELETE) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    let (collection, id) = target(&path);
    let status = response.status();
    tracing::info!(
        target: "audit",
        request_id = %request_id,
        method = %method,
        collection,
        id,
        status = status.as_u16(),
        applied = status.is_success(),
        "Mutation request"
    );

    response
}

/// ("patients", Some("123")) for "/patients/123"
fn target(path: &str) -> (&str, Option<&str>) {
    let mut segments = path.trim_start_matches('/').split('/');
    let collection = segments.next().unwrap_or_default();
    let id = segments.next().filter(|s| !s.is_empty());
    (collection, id)
}
