//! Health check endpoint

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::client::FhirEndpoint;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    fhir_server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Report whether the FHIR server answers its capability statement
pub async fn check(State(endpoint): State<FhirEndpoint>) -> impl IntoResponse {
    let fhir_server = endpoint.base_url().to_string();
    match endpoint.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                fhir_server,
                reason: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check against FHIR server failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    fhir_server,
                    reason: Some(format!("FHIR server unreachable: {}", e)),
                }),
            )
        }
    }
}
