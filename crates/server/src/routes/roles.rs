//! Practitioner roles lookup

use axum::{
    Json,
    extract::{Path, State},
};
use fhir_desk_core::Practitioner;
use serde_json::Value as JsonValue;

use crate::client::ResourceClient;
use crate::error::AppError;

/// GET /practitioners/{id}/roles - PractitionerRole resources for one practitioner
pub async fn list(
    State(client): State<ResourceClient<Practitioner>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<JsonValue>>, AppError> {
    Ok(Json(client.roles(&id).await?))
}
