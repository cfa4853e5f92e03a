//! Network boundary to the remote FHIR server
//!
//! One `FhirEndpoint` is built at startup around a shared `Transport` and
//! handed out as typed `ResourceClient`s to the page controllers.

mod http;
mod resource;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use thiserror::Error;

pub use http::ReqwestTransport;
pub use resource::{FhirEndpoint, ResourceClient};

/// Media type of every request and response body
pub const FHIR_JSON: &str = "application/fhir+json";

/// Resource client failures
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response. `detail` carries OperationOutcome diagnostics when
    /// the server sent them.
    #[error("Error: {status} - {status_text}")]
    Http {
        status: u16,
        status_text: String,
        detail: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("Invalid URL: {0}")]
    Url(String),

    /// Rejected before sending: not a FHIR logical id
    #[error("Invalid resource id: {0:?}")]
    InvalidId(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Json(err.to_string())
    }
}

/// Outgoing request, as handed to the transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    /// Value of the first header with this name (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response status and raw body
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Sends one request to the FHIR server.
///
/// Transport-level failures are reported as `ClientError::Network`; HTTP
/// error statuses are returned as ordinary responses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}
