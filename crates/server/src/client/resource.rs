//! Typed CRUD client for one FHIR resource type

use std::marker::PhantomData;
use std::sync::Arc;

use fhir_desk_core::{Bundle, FhirResource, OperationOutcome, Practitioner, SearchQuery};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use super::{ClientError, FHIR_JSON, HttpRequest, HttpResponse, Transport};

/// Base URL of the FHIR server plus the transport used to reach it
#[derive(Clone)]
pub struct FhirEndpoint {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl FhirEndpoint {
    /// Validates `base_url` and drops any trailing slash
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::Url(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Url(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        Ok(Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resource<R: FhirResource>(&self) -> ResourceClient<R> {
        ResourceClient {
            endpoint: self.clone(),
            _resource: PhantomData,
        }
    }

    /// Fetch the capability statement to confirm the server answers
    pub async fn ping(&self) -> Result<(), ClientError> {
        let request = HttpRequest::new(Method::GET, format!("{}/metadata", self.base_url))
            .header("Accept", FHIR_JSON);
        self.execute(request).await.map(|_| ())
    }

    /// Send and turn non-2xx statuses into `ClientError::Http`
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let response = self.transport.send(request).await?;
        if response.status.is_success() {
            return Ok(response);
        }

        let detail = OperationOutcome::from_body(&response.body)
            .and_then(|outcome| outcome.diagnostics().map(str::to_string));
        Err(ClientError::Http {
            status: response.status.as_u16(),
            status_text: response
                .status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            detail,
        })
    }
}

/// CRUD and search against `{base}/{R::RESOURCE_TYPE}`
pub struct ResourceClient<R> {
    endpoint: FhirEndpoint,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: FhirResource> ResourceClient<R> {
    fn collection_url(&self) -> String {
        format!("{}/{}", self.endpoint.base_url, R::RESOURCE_TYPE)
    }

    /// `{base}/{RESOURCE_TYPE}/{id}`, with `id` checked and kept to one segment
    fn instance_url(&self, id: &str) -> Result<String, ClientError> {
        check_id(id)?;
        let mut url =
            Url::parse(&self.endpoint.base_url).map_err(|e| ClientError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(format!("{} has no path", self.endpoint.base_url)))?
            .pop_if_empty()
            .push(R::RESOURCE_TYPE)
            .push(id);
        Ok(url.into())
    }

    /// POST a new resource; returns the server's copy with its assigned id
    pub async fn create(&self, resource: &R) -> Result<R, ClientError> {
        let result = async {
            let request = HttpRequest {
                body: Some(serde_json::to_vec(resource)?),
                ..HttpRequest::new(Method::POST, self.collection_url())
                    .header("Content-Type", FHIR_JSON)
            };
            let response = self.endpoint.execute(request).await?;
            decode_resource::<R>(&response.body)
        }
        .await;
        self.record("create", result)
    }

    pub async fn get(&self, id: &str) -> Result<R, ClientError> {
        let result = async {
            let request =
                HttpRequest::new(Method::GET, self.instance_url(id)?).header("Accept", FHIR_JSON);
            let response = self.endpoint.execute(request).await?;
            decode_resource::<R>(&response.body)
        }
        .await;
        self.record("read", result)
    }

    /// PUT the resource at `id`. The body's id is overwritten with `id`.
    pub async fn update(&self, id: &str, mut resource: R) -> Result<R, ClientError> {
        resource.set_id(id.to_string());
        let result = async {
            let request = HttpRequest {
                body: Some(serde_json::to_vec(&resource)?),
                ..HttpRequest::new(Method::PUT, self.instance_url(id)?)
                    .header("Content-Type", FHIR_JSON)
            };
            let response = self.endpoint.execute(request).await?;
            decode_resource::<R>(&response.body)
        }
        .await;
        self.record("update", result)
    }

    /// Resources from the searchset Bundle's entries, in server order
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<R>, ClientError> {
        let result = async {
            let url = search_url(&self.collection_url(), query)?;
            let request = HttpRequest::new(Method::GET, url).header("Accept", FHIR_JSON);
            let response = self.endpoint.execute(request).await?;
            let bundle: Bundle = decode(&response.body)?;
            if let Some(next) = bundle.next_link() {
                tracing::debug!(resource = R::RESOURCE_TYPE, next, "Showing first page only");
            }
            bundle.into_resources::<R>().map_err(ClientError::from)
        }
        .await;
        self.record("search", result)
    }

    /// DELETE the resource; the response body is ignored
    pub async fn remove(&self, id: &str) -> Result<(), ClientError> {
        let result = async {
            let request = HttpRequest::new(Method::DELETE, self.instance_url(id)?)
                .header("Accept", FHIR_JSON);
            self.endpoint.execute(request).await.map(|_| ())
        }
        .await;
        self.record("delete", result)
    }

    fn record<T>(
        &self,
        operation: &'static str,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        let outcome = match &result {
            Ok(_) => {
                tracing::debug!(resource = R::RESOURCE_TYPE, operation, "FHIR request succeeded");
                "success"
            }
            Err(err) => {
                let detail = match err {
                    ClientError::Http { detail, .. } => detail.as_deref(),
                    _ => None,
                };
                tracing::error!(
                    resource = R::RESOURCE_TYPE,
                    operation,
                    error = %err,
                    detail,
                    "FHIR request failed"
                );
                "error"
            }
        };
        metrics::counter!(
            "fhir_client_requests_total",
            "resource" => R::RESOURCE_TYPE,
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
        result
    }
}

impl ResourceClient<Practitioner> {
    /// PractitionerRole resources referencing this practitioner, as raw JSON
    pub async fn roles(&self, practitioner_id: &str) -> Result<Vec<JsonValue>, ClientError> {
        let result = async {
            check_id(practitioner_id)?;
            let query = SearchQuery::new().with(
                "practitioner",
                fhir_desk_core::QueryValue::One(practitioner_id.to_string()),
            );
            let base = format!("{}/PractitionerRole", self.endpoint.base_url);
            let request = HttpRequest::new(Method::GET, search_url(&base, &query)?)
                .header("Accept", FHIR_JSON);
            let response = self.endpoint.execute(request).await?;
            let bundle: Bundle = decode(&response.body)?;
            bundle.into_resources::<JsonValue>().map_err(ClientError::from)
        }
        .await;
        self.record("roles", result)
    }
}

fn search_url(base: &str, query: &SearchQuery) -> Result<String, ClientError> {
    let mut url = Url::parse(base).map_err(|e| ClientError::Url(e.to_string()))?;
    let pairs = query.pairs();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url.into())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    Ok(serde_json::from_slice(body)?)
}

/// Decode a single resource and make sure the server sent the type asked for
fn decode_resource<R: FhirResource>(body: &[u8]) -> Result<R, ClientError> {
    let resource: R = decode(body)?;
    if resource.resource_type() != R::RESOURCE_TYPE {
        return Err(ClientError::Json(format!(
            "expected {} but got {}",
            R::RESOURCE_TYPE,
            resource.resource_type()
        )));
    }
    Ok(resource)
}

/// FHIR logical id: 1 to 64 of `A-Z a-z 0-9 - .`
fn check_id(id: &str) -> Result<(), ClientError> {
    let well_formed = (1..=64).contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
        && id != "."
        && id != "..";
    if well_formed {
        Ok(())
    } else {
        Err(ClientError::InvalidId(id.to_string()))
    }
}
