//! fhir-desk-core: FHIR types and form mapping for the fhir-desk front end
//!
//! This crate holds the Patient, Practitioner and Organization resources,
//! the search Bundle, OperationOutcome, the flat form states with their
//! mapping to and from resources, and search criteria. It performs no I/O.

pub mod bundle;
pub mod error;
pub mod form;
pub mod outcome;
pub mod resources;
pub mod search;

pub use bundle::{Bundle, BundleEntry, BundleLink, BundleType};
pub use error::{FormError, SearchError};
pub use form::{
    EntryKey, FieldValue, FormState, KeySequence, OrganizationForm, PatientForm,
    PractitionerForm, QualificationForm, ResourceForm,
};
pub use outcome::{IssueSeverity, OperationOutcome, OperationOutcomeIssue};
pub use resources::{FhirResource, Organization, Patient, Practitioner, Qualification};
pub use search::{
    OrganizationCriteria, PatientCriteria, PractitionerCriteria, QueryValue, SearchCriteria,
    SearchQuery,
};
