//! Search criteria and FHIR search query construction

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::form::non_empty;
use crate::resources::{FhirResource, Organization, Patient, Practitioner};

/// Value of one search parameter; `Many` repeats the key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

/// FHIR search parameters, keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    params: BTreeMap<String, QueryValue>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value
    pub fn with(mut self, name: &str, value: QueryValue) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    /// Add one value, turning an existing parameter into a repeated one
    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.params.remove(name) {
            None => {
                self.params
                    .insert(name.to_string(), QueryValue::One(value));
            }
            Some(QueryValue::One(first)) => {
                self.params
                    .insert(name.to_string(), QueryValue::Many(vec![first, value]));
            }
            Some(QueryValue::Many(mut values)) => {
                values.push(value);
                self.params
                    .insert(name.to_string(), QueryValue::Many(values));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Flattened (name, value) pairs with repeated keys for multi-valued
    /// parameters, in key order
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for (name, value) in &self.params {
            match value {
                QueryValue::One(v) => pairs.push((name.as_str(), v.as_str())),
                QueryValue::Many(values) => {
                    pairs.extend(values.iter().map(|v| (name.as_str(), v.as_str())))
                }
            }
        }
        pairs
    }

    /// Add `value` under `name` when it is not blank
    fn push_trimmed(&mut self, name: &str, value: &str) {
        if let Some(v) = non_empty(value) {
            self.push(name, v);
        }
    }

    fn require_criteria(self) -> Result<Self, SearchError> {
        if self.is_empty() {
            Err(SearchError::NoCriteria)
        } else {
            Ok(self)
        }
    }
}

/// Criteria typed into a search page
pub trait SearchCriteria:
    Default + Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Resource: FhirResource;

    /// Build the query; fails when every criterion is blank
    fn to_query(&self) -> Result<SearchQuery, SearchError>;
}

/// Patient search page criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientCriteria {
    pub given_name: String,
    pub family_name: String,
    pub phone_number: String,
    pub birth_date: String,
}

impl SearchCriteria for PatientCriteria {
    type Resource = Patient;

    fn to_query(&self) -> Result<SearchQuery, SearchError> {
        let mut query = SearchQuery::new();
        query.push_trimmed("given", &self.given_name);
        query.push_trimmed("family", &self.family_name);
        if let Some(phone) = non_empty(&self.phone_number) {
            query.push("telecom", format!("phone|{}", phone));
        }
        query.push_trimmed("birthdate", &self.birth_date);
        query.require_criteria()
    }
}

/// Practitioner search page criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PractitionerCriteria {
    pub name: String,
    pub identifier: String,
    pub specialty: String,
    pub qualification: String,
    pub gender: String,
    /// "true", "false" or blank for either
    pub active: String,
}

impl SearchCriteria for PractitionerCriteria {
    type Resource = Practitioner;

    fn to_query(&self) -> Result<SearchQuery, SearchError> {
        let mut query = SearchQuery::new();
        query.push_trimmed("name", &self.name);
        query.push_trimmed("identifier", &self.identifier);
        query.push_trimmed("qualification", &self.qualification);
        query.push_trimmed("specialty", &self.specialty);
        query.push_trimmed("gender", &self.gender);
        query.push_trimmed("active", &self.active);
        query.require_criteria()
    }
}

/// Organization search page criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationCriteria {
    pub name: String,
    #[serde(rename = "type")]
    pub org_type: String,
    pub city: String,
    pub state: String,
    pub active: String,
}

impl SearchCriteria for OrganizationCriteria {
    type Resource = Organization;

    fn to_query(&self) -> Result<SearchQuery, SearchError> {
        let mut query = SearchQuery::new();
        query.push_trimmed("name", &self.name);
        query.push_trimmed("type", &self.org_type);
        query.push_trimmed("address-city", &self.city);
        query.push_trimmed("address-state", &self.state);
        query.push_trimmed("active", &self.active);
        query.require_criteria()
    }
}
