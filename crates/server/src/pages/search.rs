use fhir_desk_core::{FhirResource, SearchCriteria};
use serde::Serialize;

use super::{Confirmation, PageError, title};
use crate::client::ResourceClient;

/// One row of the result list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow<R> {
    pub id: Option<String>,
    pub display_name: String,
    pub resource: R,
}

/// Rendered search page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchView<C, R> {
    pub criteria: C,
    pub results: Vec<ResultRow<R>>,
    pub searched: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Search form plus the result list it produced
pub struct SearchPage<C: SearchCriteria> {
    client: ResourceClient<C::Resource>,
    criteria: C,
    results: Vec<C::Resource>,
    searched: bool,
    loading: bool,
    error: Option<String>,
    notice: Option<String>,
}

impl<C: SearchCriteria> SearchPage<C> {
    pub fn new(client: ResourceClient<C::Resource>) -> Self {
        Self::with_criteria(client, C::default())
    }

    pub fn with_criteria(client: ResourceClient<C::Resource>, criteria: C) -> Self {
        Self {
            client,
            criteria,
            results: Vec::new(),
            searched: false,
            loading: false,
            error: None,
            notice: None,
        }
    }

    pub fn criteria_mut(&mut self) -> &mut C {
        &mut self.criteria
    }

    pub fn results(&self) -> &[C::Resource] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Run the search. Blank criteria set the banner and send nothing.
    pub async fn submit(&mut self) -> Result<(), PageError> {
        self.error = None;
        self.notice = None;

        let query = match self.criteria.to_query() {
            Ok(query) => query,
            Err(err) => {
                self.error = Some(err.to_string());
                return Err(err.into());
            }
        };

        self.loading = true;
        self.searched = true;
        let result = self.client.search(&query).await;
        self.loading = false;

        match result {
            Ok(results) => {
                self.results = results;
                Ok(())
            }
            Err(err) => {
                self.error =
                    Some("An error occurred while searching. Please try again.".to_string());
                Err(err.into())
            }
        }
    }

    /// Delete one listed resource and drop exactly that row
    pub async fn delete(
        &mut self,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<bool, PageError> {
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }

        let label = <C::Resource as FhirResource>::RESOURCE_TYPE.to_lowercase();
        self.loading = true;
        self.error = None;
        self.notice = None;
        let result = self.client.remove(id).await;
        self.loading = false;

        match result {
            Ok(()) => {
                self.results.retain(|r| r.id() != Some(id));
                self.notice = Some(format!("{} deleted successfully", title(&label)));
                Ok(true)
            }
            Err(err) => {
                self.error = Some(format!("Failed to delete {}", label));
                Err(err.into())
            }
        }
    }

    /// Reset criteria and results
    pub fn clear(&mut self) {
        self.criteria = C::default();
        self.results.clear();
        self.searched = false;
        self.error = None;
        self.notice = None;
    }

    pub fn view(&self) -> SearchView<C, C::Resource> {
        SearchView {
            criteria: self.criteria.clone(),
            results: self
                .results
                .iter()
                .map(|r| ResultRow {
                    id: r.id().map(str::to_string),
                    display_name: r.display_name(),
                    resource: r.clone(),
                })
                .collect(),
            searched: self.searched,
            loading: self.loading,
            error: self.error.clone(),
            notice: self.notice.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fhir_desk_core::{PatientCriteria, PractitionerCriteria};
    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::client::FhirEndpoint;
    use crate::client::fake::RecordingTransport;

    fn page<C: SearchCriteria>(transport: &Arc<RecordingTransport>) -> SearchPage<C> {
        let endpoint = FhirEndpoint::new(transport.clone(), "http://fhir.test/baseR4").unwrap();
        SearchPage::new(endpoint.resource())
    }

    fn two_patients() -> serde_json::Value {
        json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "p1",
                    "name": [{"given": ["Jane"], "family": "Doe"}]}},
                {"resource": {"resourceType": "Patient", "id": "p2"}}
            ]
        })
    }

    #[tokio::test]
    async fn blank_criteria_send_nothing() {
        let transport = Arc::new(RecordingTransport::new());
        let mut page: SearchPage<PatientCriteria> = page(&transport);

        assert!(matches!(page.submit().await, Err(PageError::Search(_))));
        assert_eq!(page.error(), Some("Please enter at least one search criteria"));
        assert!(!page.view().searched);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn results_render_with_display_names() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(StatusCode::OK, two_patients());
        let mut page: SearchPage<PatientCriteria> = page(&transport);
        page.criteria_mut().family_name = "Doe".to_string();

        page.submit().await.unwrap();

        let view = page.view();
        assert!(view.searched);
        assert_eq!(view.results.len(), 2);
        assert_eq!(view.results[0].display_name, "Jane Doe");
        assert_eq!(view.results[1].display_name, "Unnamed Patient");
    }

    #[tokio::test]
    async fn search_failure_sets_generic_banner() {
        let transport = Arc::new(RecordingTransport::new());
        transport.fail("connection reset");
        let mut page: SearchPage<PractitionerCriteria> = page(&transport);
        page.criteria_mut().name = "Smith".to_string();

        assert!(page.submit().await.is_err());
        assert_eq!(
            page.error(),
            Some("An error occurred while searching. Please try again.")
        );
    }

    #[tokio::test]
    async fn delete_drops_only_the_matching_row() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(StatusCode::OK, two_patients());
        transport.respond_empty(StatusCode::NO_CONTENT);
        let mut page: SearchPage<PatientCriteria> = page(&transport);
        page.criteria_mut().family_name = "Doe".to_string();
        page.submit().await.unwrap();

        assert!(!page.delete("p1", Confirmation::Declined).await.unwrap());
        assert_eq!(page.results().len(), 2);

        assert!(page.delete("p1", Confirmation::Confirmed).await.unwrap());
        let ids: Vec<_> = page.results().iter().filter_map(|p| p.id()).collect();
        assert_eq!(ids, vec!["p2"]);
        assert_eq!(page.view().notice.as_deref(), Some("Patient deleted successfully"));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn failed_delete_keeps_results() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(StatusCode::OK, two_patients());
        transport.respond_empty(StatusCode::CONFLICT);
        let mut page: SearchPage<PatientCriteria> = page(&transport);
        page.criteria_mut().family_name = "Doe".to_string();
        page.submit().await.unwrap();

        assert!(page.delete("p2", Confirmation::Confirmed).await.is_err());
        assert_eq!(page.results().len(), 2);
        assert_eq!(page.error(), Some("Failed to delete patient"));
        assert!(!page.view().loading);
    }

    #[tokio::test]
    async fn retried_delete_clears_the_banner() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(StatusCode::OK, two_patients());
        transport.fail("connection reset");
        transport.respond_empty(StatusCode::NO_CONTENT);
        let mut page: SearchPage<PatientCriteria> = page(&transport);
        page.criteria_mut().family_name = "Doe".to_string();
        page.submit().await.unwrap();

        assert!(page.delete("p1", Confirmation::Confirmed).await.is_err());
        assert!(page.delete("p1", Confirmation::Confirmed).await.unwrap());

        let view = page.view();
        assert!(view.error.is_none());
        assert!(!view.loading);
        assert_eq!(view.results.len(), 1);
    }

    #[tokio::test]
    async fn clear_resets_everything() {
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(StatusCode::OK, two_patients());
        let mut page: SearchPage<PatientCriteria> = page(&transport);
        page.criteria_mut().family_name = "Doe".to_string();
        page.submit().await.unwrap();

        page.clear();

        let view = page.view();
        assert_eq!(view.criteria, PatientCriteria::default());
        assert!(view.results.is_empty());
        assert!(!view.searched);
    }
}
