use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// FHIR Bundle types
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    #[default]
    Searchset,
    History,
    Collection,
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
}

fn bundle_type_name() -> String {
    "Bundle".to_string()
}

/// FHIR Bundle resource (simplified for search responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default = "bundle_type_name")]
    pub resource_type: String,

    #[serde(rename = "type", default)]
    pub bundle_type: BundleType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<BundleLink>,

    /// Servers omit `entry` entirely when nothing matched
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

/// Navigation link (self, next, previous)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

/// Single entry of a bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<JsonValue>,
}

impl Bundle {
    /// Unwrap `entry[].resource` into typed resources, in bundle order.
    ///
    /// Entries without a resource are skipped. Duplicates are kept.
    pub fn into_resources<R: DeserializeOwned>(self) -> Result<Vec<R>, serde_json::Error> {
        self.entry
            .into_iter()
            .filter_map(|entry| entry.resource)
            .map(serde_json::from_value)
            .collect()
    }

    /// URL of the `next` page link, if the server paged the result
    pub fn next_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.relation == "next")
            .map(|l| l.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Patient;

    #[test]
    fn missing_entry_yields_empty_result() {
        let bundle: Bundle = serde_json::from_value(serde_json::json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "total": 0
        }))
        .unwrap();

        let patients: Vec<Patient> = bundle.into_resources().unwrap();
        assert!(patients.is_empty());
    }

    #[test]
    fn entries_unwrap_in_order_without_dedup() {
        let bundle: Bundle = serde_json::from_value(serde_json::json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "link": [{"relation": "next", "url": "http://fhir.example/Patient?page=2"}],
            "entry": [
                {"fullUrl": "http://fhir.example/Patient/2", "resource": {"resourceType": "Patient", "id": "2"}},
                {"fullUrl": "http://fhir.example/Patient/1", "resource": {"resourceType": "Patient", "id": "1"}},
                {"fullUrl": "http://fhir.example/Patient/2", "resource": {"resourceType": "Patient", "id": "2"}},
                {"fullUrl": "http://fhir.example/Patient/3"}
            ]
        }))
        .unwrap();

        assert_eq!(bundle.next_link(), Some("http://fhir.example/Patient?page=2"));

        let ids: Vec<Option<String>> = bundle
            .into_resources::<Patient>()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(
            ids,
            vec![Some("2".to_string()), Some("1".to_string()), Some("2".to_string())]
        );
    }

    #[test]
    fn bare_object_is_an_empty_searchset() {
        let bundle: Bundle = serde_json::from_str("{}").unwrap();
        assert_eq!(bundle.bundle_type, BundleType::Searchset);
        assert_eq!(bundle.resource_type, "Bundle");
        assert!(bundle.entry.is_empty());
    }
}
