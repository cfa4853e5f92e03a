pub mod health;
pub mod metrics;
mod resource;
mod roles;

use axum::{Router, http::Uri, routing::get};
use fhir_desk_core::{
    OrganizationCriteria, OrganizationForm, PatientCriteria, PatientForm, Practitioner,
    PractitionerCriteria, PractitionerForm,
};

use crate::client::FhirEndpoint;
use crate::error::AppError;

pub const PATIENTS: &str = "patients";
pub const PRACTITIONERS: &str = "practitioners";
pub const ORGANIZATIONS: &str = "organizations";

/// Top-level path segments that hold resource instances
pub const COLLECTIONS: [&str; 3] = [PATIENTS, PRACTITIONERS, ORGANIZATIONS];

/// Build the page routes for every resource collection
pub fn desk_routes(endpoint: &FhirEndpoint) -> Router {
    let roles = Router::new()
        .route(
            &format!("/{}/{{id}}/roles", PRACTITIONERS),
            get(roles::list),
        )
        .with_state(endpoint.resource::<Practitioner>());

    Router::new()
        .merge(resource::collection_routes::<PatientForm, PatientCriteria>(
            endpoint.resource(),
            PATIENTS,
        ))
        .merge(resource::collection_routes::<
            PractitionerForm,
            PractitionerCriteria,
        >(endpoint.resource(), PRACTITIONERS))
        .merge(resource::collection_routes::<
            OrganizationForm,
            OrganizationCriteria,
        >(endpoint.resource(), ORGANIZATIONS))
        .merge(roles)
}

/// Fallback for unknown paths
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No page at {}", uri.path()))
}
