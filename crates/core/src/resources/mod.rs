//! FHIR resources edited by the front end

pub mod datatypes;
mod organization;
mod patient;
mod practitioner;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use organization::Organization;
pub use patient::{Patient, PatientCommunication};
pub use practitioner::{Practitioner, Qualification};

/// A FHIR resource type reachable at `{base}/{RESOURCE_TYPE}`
pub trait FhirResource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// FHIR type name, also the REST collection path segment
    const RESOURCE_TYPE: &'static str;

    /// Server-assigned logical id, absent before creation
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// `resourceType` as read from the body
    fn resource_type(&self) -> &str;

    /// Label shown in result lists
    fn display_name(&self) -> String;
}
