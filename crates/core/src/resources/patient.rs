use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::FhirResource;
use super::datatypes::{Address, CodeableConcept, ContactPoint, HumanName};

fn patient_type() -> String {
    Patient::RESOURCE_TYPE.to_string()
}

/// FHIR Patient resource
///
/// Members the front end does not edit are kept in `extra` so an update
/// sends them back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default = "patient_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub communication: Vec<PatientCommunication>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Language a patient may use to communicate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientCommunication {
    #[serde(default)]
    pub language: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred: Option<bool>,
}

impl Patient {
    pub fn new() -> Self {
        Self {
            resource_type: patient_type(),
            id: None,
            active: None,
            name: Vec::new(),
            telecom: Vec::new(),
            gender: None,
            birth_date: None,
            address: Vec::new(),
            communication: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Default for Patient {
    fn default() -> Self {
        Self::new()
    }
}

impl FhirResource for Patient {
    const RESOURCE_TYPE: &'static str = "Patient";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn display_name(&self) -> String {
        let Some(name) = self.name.first() else {
            return "Unnamed Patient".to_string();
        };
        let given = name.first_given().unwrap_or("");
        let family = name.family.as_deref().unwrap_or("");
        format!("{} {}", given, family).trim().to_string()
    }
}
