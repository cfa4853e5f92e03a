//! FHIR R4 complex datatypes shared by the edited resources

use serde::{Deserialize, Serialize};

/// Code system for `ContactPoint.system`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContactPointSystem {
    Phone,
    Email,
    Url,
}

impl ContactPointSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactPointSystem::Phone => "phone",
            ContactPointSystem::Email => "email",
            ContactPointSystem::Url => "url",
        }
    }
}

/// FHIR HumanName
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanName {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub name_use: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefix: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suffix: Vec<String>,
}

impl HumanName {
    pub fn first_given(&self) -> Option<&str> {
        self.given.first().map(String::as_str)
    }

    pub fn first_prefix(&self) -> Option<&str> {
        self.prefix.first().map(String::as_str)
    }

    pub fn first_suffix(&self) -> Option<&str> {
        self.suffix.first().map(String::as_str)
    }
}

/// FHIR ContactPoint (telecom entry)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    /// Kept as a raw string so systems other than phone/email/url survive a fetch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub contact_use: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl ContactPoint {
    pub fn new(system: ContactPointSystem, value: impl Into<String>) -> Self {
        Self {
            system: Some(system.as_str().to_string()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn with_use(mut self, contact_use: &str) -> Self {
        self.contact_use = Some(contact_use.to_string());
        self
    }

    pub fn is_system(&self, system: ContactPointSystem) -> bool {
        self.system.as_deref() == Some(system.as_str())
    }
}

/// Value of the first telecom entry with the given system.
///
/// Later entries of the same system are ignored.
pub fn first_telecom(telecom: &[ContactPoint], system: ContactPointSystem) -> Option<&str> {
    telecom
        .iter()
        .find(|t| t.is_system(system))
        .and_then(|t| t.value.as_deref())
}

/// FHIR Address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub address_use: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    /// True when no postal field is set (`use`/`type` markers are ignored)
    pub fn is_blank(&self) -> bool {
        self.text.is_none()
            && self.line.is_empty()
            && self.city.is_none()
            && self.district.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
            && self.country.is_none()
    }
}

/// FHIR Coding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// FHIR CodeableConcept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// A concept holding exactly one coding
    pub fn coded(system: Option<&str>, code: impl Into<String>) -> Self {
        Self {
            coding: vec![Coding {
                system: system.map(str::to_string),
                code: Some(code.into()),
                display: None,
            }],
            text: None,
        }
    }

    pub fn first_code(&self) -> Option<&str> {
        self.coding.first().and_then(|c| c.code.as_deref())
    }

    /// Human label: text, then first display, then first code
    pub fn label(&self) -> Option<&str> {
        self.text
            .as_deref()
            .or_else(|| self.coding.first().and_then(|c| c.display.as_deref()))
            .or_else(|| self.first_code())
    }
}

/// FHIR Period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl Period {
    /// Build a period, or `None` when neither bound is set
    pub fn from_bounds(start: Option<String>, end: Option<String>) -> Option<Self> {
        if start.is_none() && end.is_none() {
            None
        } else {
            Some(Self { start, end })
        }
    }
}

/// FHIR Reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}
