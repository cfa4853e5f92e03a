//! Integration tests for the fhir-desk page server.
//!
//! The router is driven in-process with `oneshot`; the FHIR server behind it
//! is an in-memory fake plugged in through the `Transport` seam, so no
//! network or external server is needed.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use reqwest::Url;
use serde_json::{Value as JsonValue, json};
use tower::ServiceExt;

use fhir_desk::client::{ClientError, FhirEndpoint, HttpRequest, HttpResponse, Transport};
use fhir_desk::config::Config;

// ---------------------------------------------------------------------------
// In-memory FHIR server
// ---------------------------------------------------------------------------

/// Minimal FHIR REST server: create, read, update, delete and unfiltered
/// search per resource type, plus PractitionerRole lookup by practitioner.
#[derive(Default)]
struct InMemoryFhir {
    store: Mutex<BTreeMap<(String, String), JsonValue>>,
    next_id: AtomicU64,
    requests: Mutex<Vec<HttpRequest>>,
    down: AtomicBool,
}

impl InMemoryFhir {
    fn seed(&self, resource: JsonValue) {
        let key = (
            resource["resourceType"].as_str().unwrap().to_string(),
            resource["id"].as_str().unwrap().to_string(),
        );
        self.store.lock().unwrap().insert(key, resource);
    }

    fn stored(&self, resource_type: &str, id: &str) -> Option<JsonValue> {
        self.store
            .lock()
            .unwrap()
            .get(&(resource_type.to_string(), id.to_string()))
            .cloned()
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn take_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    fn search(&self, resource_type: &str, url: &Url) -> JsonValue {
        let practitioner = url
            .query_pairs()
            .find(|(k, _)| k == "practitioner")
            .map(|(_, v)| format!("Practitioner/{}", v));

        let matches: Vec<JsonValue> = self
            .store
            .lock()
            .unwrap()
            .iter()
            .filter(|((t, _), _)| t.as_str() == resource_type)
            .filter(|(_, r)| match &practitioner {
                Some(reference) => r["practitioner"]["reference"] == json!(reference),
                None => true,
            })
            .map(|(_, r)| json!({ "resource": r }))
            .collect();

        let mut bundle = json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "total": matches.len(),
        });
        if !matches.is_empty() {
            bundle["entry"] = JsonValue::Array(matches);
        }
        bundle
    }
}

fn fhir_response(status: StatusCode, body: JsonValue) -> Result<HttpResponse, ClientError> {
    Ok(HttpResponse {
        status,
        body: serde_json::to_vec(&body).unwrap(),
    })
}

fn not_found(resource_type: &str, id: &str) -> Result<HttpResponse, ClientError> {
    fhir_response(
        StatusCode::NOT_FOUND,
        json!({
            "resourceType": "OperationOutcome",
            "issue": [{
                "severity": "error",
                "code": "not-found",
                "diagnostics": format!("Resource {}/{} is not known", resource_type, id)
            }]
        }),
    )
}

#[async_trait]
impl Transport for InMemoryFhir {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.down.load(Ordering::SeqCst) {
            return Err(ClientError::Network("connection refused".to_string()));
        }

        let url = Url::parse(&request.url).unwrap();
        // Skip the "baseR4" prefix of the base URL
        let segments: Vec<String> = url
            .path_segments()
            .unwrap()
            .skip(1)
            .map(String::from)
            .collect();
        let body: Option<JsonValue> = request
            .body
            .as_ref()
            .map(|b| serde_json::from_slice(b).unwrap());

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", [metadata]) if metadata == "metadata" => fhir_response(
                StatusCode::OK,
                json!({"resourceType": "CapabilityStatement", "fhirVersion": "4.0.1"}),
            ),
            ("GET", [resource_type]) => {
                fhir_response(StatusCode::OK, self.search(resource_type, &url))
            }
            ("POST", [_]) => {
                let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
                let mut resource = body.unwrap();
                resource["id"] = json!(id);
                resource["meta"] = json!({"versionId": "1"});
                self.seed(resource.clone());
                fhir_response(StatusCode::CREATED, resource)
            }
            ("GET", [resource_type, id]) => match self.stored(resource_type, id) {
                Some(resource) => fhir_response(StatusCode::OK, resource),
                None => not_found(resource_type, id),
            },
            ("PUT", [resource_type, id]) => {
                let Some(previous) = self.stored(resource_type, id) else {
                    return not_found(resource_type, id);
                };
                let version: u64 = previous["meta"]["versionId"]
                    .as_str()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1);
                let mut resource = body.unwrap();
                resource["meta"] = json!({"versionId": (version + 1).to_string()});
                self.seed(resource.clone());
                fhir_response(StatusCode::OK, resource)
            }
            ("DELETE", [resource_type, id]) => {
                let removed = self
                    .store
                    .lock()
                    .unwrap()
                    .remove(&(resource_type.clone(), id.clone()));
                match removed {
                    Some(_) => fhir_response(
                        StatusCode::OK,
                        json!({"resourceType": "OperationOutcome", "issue": []}),
                    ),
                    None => not_found(resource_type, id),
                }
            }
            _ => fhir_response(StatusCode::BAD_REQUEST, json!({})),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const BASE_URL: &str = "http://fhir.test/baseR4";

/// Build the app router around a fresh in-memory FHIR server.
fn test_app() -> (Router, Arc<InMemoryFhir>) {
    let fhir = Arc::new(InMemoryFhir::default());
    let config = Config {
        fhir_base_url: BASE_URL.to_string(),
        bind_address: "0.0.0.0:0".to_string(),
        cors_origins: vec!["*".to_string()],
    };
    let endpoint = FhirEndpoint::new(fhir.clone(), &config.fhir_base_url).unwrap();
    (fhir_desk::build_app(endpoint, &config), fhir)
}

/// Send a request to the app and return (status, body as JSON).
async fn request(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };

    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn put(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Submit a create form and return the Location header.
async fn create(app: &Router, collection: &str, form: JsonValue) -> String {
    let response = app
        .clone()
        .oneshot(post(&format!("/{}", collection), form))
        .await
        .expect("Create request failed");

    assert_eq!(response.status(), StatusCode::CREATED);

    response
        .headers()
        .get("Location")
        .expect("Missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

fn sample_patient_form(given: &str, family: &str) -> JsonValue {
    json!({
        "givenName": given,
        "familyName": family,
        "gender": "female",
        "birthDate": "1990-05-15",
        "phone": "555-0100"
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let (app, fhir) = test_app();

    let (status, body) = request(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(fhir.requests()[0].url, format!("{}/metadata", BASE_URL));

    fhir.take_down();
    let (status, body) = request(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _fhir) = test_app();

    let response = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (app, fhir) = test_app();

    let (status, body) = request(&app, get("/encounters")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No page at /encounters");
    assert!(fhir.requests().is_empty());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (app, _fhir) = test_app();

    let req = Request::builder()
        .uri("/patients")
        .header("X-Request-ID", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    let response = app.clone().oneshot(get("/patients")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_blank_create_form() {
    let (app, _fhir) = test_app();

    let (status, body) = request(&app, get("/practitioners/new")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["active"], true);
    assert_eq!(body["form"]["qualifications"].as_array().unwrap().len(), 1);
    assert_eq!(body["loading"], false);
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn test_patient_lifecycle() {
    let (app, fhir) = test_app();

    // 1. Create
    let location = create(&app, "patients", sample_patient_form("Jane", "Doe")).await;
    assert_eq!(location, "/patients/1");
    let sent: JsonValue =
        serde_json::from_slice(fhir.requests()[0].body.as_ref().unwrap()).unwrap();
    assert_eq!(sent["resourceType"], "Patient");
    assert_eq!(sent["telecom"], json!([{"system": "phone", "value": "555-0100"}]));
    assert_eq!(
        fhir.requests()[0].header_value("Content-Type"),
        Some("application/fhir+json")
    );

    // 2. Read
    let (status, body) = request(&app, get(&location)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "1");
    assert_eq!(body["form"]["givenName"], "Jane");
    assert_eq!(body["form"]["phone"], "555-0100");
    assert_eq!(body["editMode"], false);

    // 3. Update
    let (status, body) = request(&app, put(&location, sample_patient_form("Jane", "Smith"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resource"]["name"][0]["family"], "Smith");
    assert_eq!(body["resource"]["meta"]["versionId"], "2");
    assert_eq!(body["notice"], "Patient updated successfully");

    let put_request = fhir
        .requests()
        .into_iter()
        .find(|r| r.method.as_str() == "PUT")
        .unwrap();
    assert_eq!(put_request.url, format!("{}/Patient/1", BASE_URL));
    let sent: JsonValue = serde_json::from_slice(put_request.body.as_ref().unwrap()).unwrap();
    assert_eq!(sent["id"], "1");
    assert_eq!(sent["meta"]["versionId"], "1");

    // 4. Delete without confirmation sends nothing
    let before = fhir.requests().len();
    let (status, body) = request(&app, delete(&location)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "Are you sure you want to delete this patient? This action cannot be undone."
    );
    assert_eq!(fhir.requests().len(), before);

    // 5. Confirmed delete
    let (status, _) = request(&app, delete(&format!("{}?confirm=true", location))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(fhir.stored("Patient", "1").is_none());

    // 6. Read after delete
    let (status, body) = request(&app, get(&location)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        "Failed to load patient data. Please try again later."
    );
    assert!(body["resource"].is_null());
}

#[tokio::test]
async fn test_update_keeps_members_the_form_does_not_edit() {
    let (app, fhir) = test_app();
    fhir.seed(json!({
        "resourceType": "Organization",
        "id": "org-7",
        "meta": {"versionId": "4"},
        "identifier": [{"system": "urn:oid:2.16.840.1.113883.4.7", "value": "12D4567890"}],
        "name": "Acme Clinic",
        "active": true
    }));

    let (status, body) = request(&app, get("/organizations/org-7")).await;
    assert_eq!(status, StatusCode::OK);
    let mut form = body["form"].clone();
    form["name"] = json!("Acme Health");
    form["phone"] = json!("555-0100");

    let (status, body) = request(&app, put("/organizations/org-7", form)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resource"]["name"], "Acme Health");

    let stored = fhir.stored("Organization", "org-7").unwrap();
    assert_eq!(stored["identifier"][0]["value"], "12D4567890");
    assert_eq!(
        stored["telecom"],
        json!([{"system": "phone", "value": "555-0100", "use": "work"}])
    );
}

#[tokio::test]
async fn test_search_pages() {
    let (app, fhir) = test_app();
    create(&app, "patients", sample_patient_form("Jane", "Doe")).await;
    create(&app, "patients", sample_patient_form("John", "Doe")).await;
    let after_setup = fhir.requests().len();

    // No query string: empty page, nothing sent
    let (status, body) = request(&app, get("/patients")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["searched"], false);
    assert_eq!(body["results"], json!([]));
    assert_eq!(fhir.requests().len(), after_setup);

    // Blank criteria: banner, nothing sent
    let (status, body) = request(&app, get("/patients?givenName=&familyName=%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter at least one search criteria");
    assert_eq!(fhir.requests().len(), after_setup);

    // Real search
    let (status, body) = request(&app, get("/patients?familyName=Doe&phoneNumber=555-0100")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["searched"], true);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["displayName"], "Jane Doe");
    assert_eq!(results[1]["id"], "2");

    let search_request = fhir.requests().pop().unwrap();
    assert_eq!(
        search_request.url,
        format!("{}/Patient?family=Doe&telecom=phone%7C555-0100", BASE_URL)
    );
    assert_eq!(
        search_request.header_value("Accept"),
        Some("application/fhir+json")
    );
}

#[tokio::test]
async fn test_search_with_no_matches_is_empty() {
    let (app, _fhir) = test_app();

    let (status, body) = request(&app, get("/organizations?city=Springfield")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([]));
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn test_practitioner_create_and_roles() {
    let (app, fhir) = test_app();

    let form = json!({
        "prefix": "Dr",
        "givenName": "Ada",
        "familyName": "Lovelace",
        "communication": "en",
        "qualifications": [
            {"text": "Doctor of Medicine", "code": "MD", "issuer": "State Board", "startDate": "2010-06-01"},
            {"text": "Board certified"},
            {"text": "   "}
        ]
    });
    let location = create(&app, "practitioners", form).await;
    let id = location.rsplit('/').next().unwrap().to_string();

    let stored = fhir.stored("Practitioner", &id).unwrap();
    let qualifications = stored["qualification"].as_array().unwrap();
    assert_eq!(qualifications.len(), 2);
    assert_eq!(qualifications[0]["code"]["coding"][0]["code"], "MD");
    assert_eq!(qualifications[0]["period"]["start"], "2010-06-01");
    assert_eq!(qualifications[0]["issuer"]["display"], "State Board");
    // Missing start date is stamped on create
    assert!(qualifications[1]["period"]["start"].is_string());
    assert_eq!(stored["communication"][0]["coding"][0]["code"], "en");

    fhir.seed(json!({
        "resourceType": "PractitionerRole",
        "id": "role-1",
        "practitioner": {"reference": format!("Practitioner/{}", id)},
        "code": [{"text": "Cardiologist"}]
    }));
    fhir.seed(json!({
        "resourceType": "PractitionerRole",
        "id": "role-2",
        "practitioner": {"reference": "Practitioner/someone-else"}
    }));

    let (status, body) = request(&app, get(&format!("{}/roles", location))).await;
    assert_eq!(status, StatusCode::OK);
    let roles = body.as_array().unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0]["id"], "role-1");
    assert_eq!(
        fhir.requests().pop().unwrap().url,
        format!("{}/PractitionerRole?practitioner={}", BASE_URL, id)
    );
}

#[tokio::test]
async fn test_upstream_failure_sets_banner() {
    let (app, fhir) = test_app();
    fhir.take_down();

    let form = json!({"name": "Acme", "phone": "555-0100"});
    let (status, body) = request(&app, post("/organizations", form)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["error"],
        "Failed to create organization: Network error: connection refused"
    );
    assert_eq!(body["form"]["name"], "Acme");
    assert_eq!(body["loading"], false);

    let (status, body) = request(&app, get("/practitioners?name=Smith")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["error"],
        "An error occurred while searching. Please try again."
    );
}

#[tokio::test]
async fn test_malformed_form_is_rejected() {
    let (app, fhir) = test_app();

    // `active` must be a boolean
    let (status, _) = request(&app, post("/patients", json!({"active": "yes"}))).await;
    assert!(status.is_client_error());
    assert!(fhir.requests().is_empty());
}

#[tokio::test]
async fn test_encoded_ids_cannot_reach_other_resources() {
    let (app, fhir) = test_app();
    fhir.seed(json!({"resourceType": "Organization", "id": "5", "name": "Acme"}));

    let (status, body) = request(
        &app,
        delete("/patients/..%2FOrganization%2F5?confirm=true"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Failed to delete patient: Invalid resource id: \"../Organization/5\""
    );

    let (status, _) = request(&app, get("/patients/1%3F_cascade%3Ddelete")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(fhir.requests().is_empty());
    assert!(fhir.stored("Organization", "5").is_some());
}
