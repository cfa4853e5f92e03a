use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::FhirResource;
use super::datatypes::{CodeableConcept, ContactPoint, HumanName, Period, Reference};

fn practitioner_type() -> String {
    Practitioner::RESOURCE_TYPE.to_string()
}

/// FHIR Practitioner resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    #[serde(default = "practitioner_type")]
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
    pub qualification: Vec<Qualification>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub communication: Vec<CodeableConcept>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Certification, license or training held by a practitioner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Qualification {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<JsonValue>,

    #[serde(default)]
    pub code: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Reference>,
}

impl Practitioner {
    pub fn new() -> Self {
        Self {
            resource_type: practitioner_type(),
            id: None,
            active: None,
            name: Vec::new(),
            telecom: Vec::new(),
            gender: None,
            birth_date: None,
            qualification: Vec::new(),
            communication: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Comma-separated qualification labels for result lists
    pub fn qualification_summary(&self) -> String {
        self.qualification
            .iter()
            .map(|q| q.code.label().unwrap_or(""))
            .filter(|label| !label.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for Practitioner {
    fn default() -> Self {
        Self::new()
    }
}

impl FhirResource for Practitioner {
    const RESOURCE_TYPE: &'static str = "Practitioner";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// "Dr John Smith, Jr" style label
    fn display_name(&self) -> String {
        let Some(name) = self.name.first() else {
            return "Unnamed Practitioner".to_string();
        };

        let prefix = name
            .first_prefix()
            .map(|p| format!("{} ", p))
            .unwrap_or_default();
        let given = name.first_given().unwrap_or("");
        let family = name.family.as_deref().unwrap_or("");
        let suffix = name
            .first_suffix()
            .map(|s| format!(", {}", s))
            .unwrap_or_default();

        format!("{}{} {}{}", prefix, given, family, suffix)
            .trim()
            .to_string()
    }
}
