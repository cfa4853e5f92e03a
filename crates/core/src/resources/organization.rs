use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::FhirResource;
use super::datatypes::{Address, CodeableConcept, ContactPoint};

fn organization_type() -> String {
    Organization::RESOURCE_TYPE.to_string()
}

/// FHIR Organization resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default = "organization_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub org_type: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Organization {
    pub fn new() -> Self {
        Self {
            resource_type: organization_type(),
            id: None,
            active: None,
            org_type: Vec::new(),
            name: None,
            telecom: Vec::new(),
            address: Vec::new(),
            extra: Map::new(),
        }
    }

    /// "City, State" of the first address, skipping missing parts
    pub fn location(&self) -> String {
        self.address
            .first()
            .map(|a| {
                [a.city.as_deref(), a.state.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }
}

impl Default for Organization {
    fn default() -> Self {
        Self::new()
    }
}

impl FhirResource for Organization {
    const RESOURCE_TYPE: &'static str = "Organization";

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
        self.name
            .clone()
            .unwrap_or_else(|| "Unnamed Organization".to_string())
    }
}
