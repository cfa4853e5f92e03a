//! Flat form states and their mapping to and from FHIR resources
//!
//! Each resource has one form type. The mapping is lossy on purpose: a form
//! holds at most one value per telecom system and a single address, so
//! repeated telecom entries and extra addresses on a fetched resource do not
//! survive a round trip through the form.

mod organization;
mod patient;
mod practitioner;

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::resources::FhirResource;
use crate::resources::datatypes::{Address, ContactPoint, ContactPointSystem};

pub use organization::OrganizationForm;
pub use patient::PatientForm;
pub use practitioner::{PractitionerForm, QualificationForm};

/// Value typed into a form control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl FieldValue {
    pub(crate) fn into_text(self, field: &str) -> Result<String, FormError> {
        match self {
            FieldValue::Text(text) => Ok(text),
            FieldValue::Flag(_) => Err(FormError::InvalidValue {
                field: field.to_string(),
                expected: "text",
            }),
        }
    }

    pub(crate) fn into_flag(self, field: &str) -> Result<bool, FormError> {
        match self {
            FieldValue::Flag(flag) => Ok(flag),
            FieldValue::Text(_) => Err(FormError::InvalidValue {
                field: field.to_string(),
                expected: "boolean",
            }),
        }
    }
}

/// Field-by-field mutation, keyed by the form control name
pub trait FormState {
    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FormError>;
}

/// Identifier of a repeated sub-form within one edit session.
///
/// Only used to address entries while editing; never written to a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryKey(u64);

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntryKey {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(EntryKey)
    }
}

/// Hands out entry keys for the lifetime of one edit session
#[derive(Debug, Clone)]
pub struct KeySequence {
    next: u64,
}

impl KeySequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_key(&mut self) -> EntryKey {
        let key = EntryKey(self.next);
        self.next += 1;
        key
    }
}

impl Default for KeySequence {
    fn default() -> Self {
        Self::new()
    }
}

/// A form bound to the resource type it edits
pub trait ResourceForm:
    FormState + Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Resource: FhirResource;

    /// Lowercase resource label used in page messages
    const LABEL: &'static str;

    /// Empty form for the create page
    fn blank(keys: &mut KeySequence) -> Self;

    /// Build a new resource from the form (create path)
    fn to_resource(&self) -> Self::Resource;

    /// Overlay the form on a fetched resource (update path).
    ///
    /// The id and every member the form does not own are kept.
    fn apply_to(&self, existing: Self::Resource) -> Self::Resource;

    /// Flatten a resource into the form
    fn from_resource(resource: &Self::Resource, keys: &mut KeySequence) -> Self;

    /// Give every repeated sub-form a key from this session
    fn rekey(&mut self, _keys: &mut KeySequence) {}
}

/// Trimmed value, or `None` when blank
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn text_or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Telecom list in fixed system order, skipping blank values
pub(crate) fn telecom_entries(
    values: &[(ContactPointSystem, &str)],
    contact_use: Option<&str>,
) -> Vec<ContactPoint> {
    values
        .iter()
        .filter_map(|(system, value)| {
            let value = non_empty(value)?;
            let entry = ContactPoint::new(*system, value);
            Some(match contact_use {
                Some(u) => entry.with_use(u),
                None => entry,
            })
        })
        .collect()
}

/// Postal fields shared by the patient and organization forms
pub(crate) struct AddressFields<'a> {
    pub line1: &'a str,
    pub line2: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub postal_code: &'a str,
    pub country: &'a str,
}

impl AddressFields<'_> {
    /// Single-entry address list; empty when every field is blank
    pub(crate) fn to_addresses(&self, address_use: &str, address_type: Option<&str>) -> Vec<Address> {
        let address = Address {
            address_use: Some(address_use.to_string()),
            address_type: address_type.map(str::to_string),
            text: None,
            line: [self.line1, self.line2]
                .into_iter()
                .filter_map(non_empty)
                .collect(),
            city: non_empty(self.city),
            district: None,
            state: non_empty(self.state),
            postal_code: non_empty(self.postal_code),
            country: non_empty(self.country),
        };

        if address.is_blank() {
            Vec::new()
        } else {
            vec![address]
        }
    }
}

/// First address, flattened into (line1, line2, city, state, postalCode, country).
///
/// An address without lines falls back to its free text for line 1.
pub(crate) fn flatten_address(addresses: &[Address]) -> [String; 6] {
    let Some(address) = addresses.first() else {
        return Default::default();
    };
    let line1 = address
        .line
        .first()
        .or(address.text.as_ref())
        .cloned()
        .unwrap_or_default();

    [
        line1,
        text_or_empty(address.line.get(1).map(String::as_str)),
        text_or_empty(address.city.as_deref()),
        text_or_empty(address.state.as_deref()),
        text_or_empty(address.postal_code.as_deref()),
        text_or_empty(address.country.as_deref()),
    ]
}

/// Normalize a date or date-time input to `YYYY-MM-DD`.
///
/// Partial FHIR dates (`1980`, `1980-04`) and unparseable input pass through
/// trimmed so the server can judge them.
pub(crate) fn normalize_date(raw: &str) -> Option<String> {
    let raw = non_empty(raw)?;

    if let Ok(date_time) = DateTime::parse_from_rfc3339(&raw) {
        return Some(date_time.date_naive().format("%Y-%m-%d").to_string());
    }

    let date_part = raw.split('T').next().unwrap_or(&raw);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date.format("%Y-%m-%d").to_string()),
        Err(_) => Some(raw),
    }
}

/// Date portion of a FHIR date or dateTime, for date inputs
pub(crate) fn date_input(value: Option<&str>) -> String {
    value
        .and_then(|v| v.split('T').next())
        .unwrap_or_default()
        .to_string()
}
