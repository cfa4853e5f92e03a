//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value as JsonValue, json};

use crate::client::ClientError;
use crate::pages::PageError;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
    /// A page action failed; the body is the page view with its banner
    Page { status: StatusCode, view: JsonValue },
}

impl AppError {
    pub fn page(err: &PageError, view: impl Serialize) -> Self {
        match serde_json::to_value(view) {
            Ok(view) => AppError::Page {
                status: page_status(err),
                view,
            },
            Err(e) => AppError::Internal(format!("Failed to render page: {}", e)),
        }
    }
}

fn page_status(err: &PageError) -> StatusCode {
    match err {
        PageError::Client(err) => client_status(err),
        PageError::Form(_) | PageError::Search(_) | PageError::MissingId(_) => {
            StatusCode::BAD_REQUEST
        }
        PageError::NotLoaded(_) => StatusCode::CONFLICT,
    }
}

/// Upstream 404/410 stay "not found"; anything else is the FHIR server's fault
fn client_status(err: &ClientError) -> StatusCode {
    match err {
        ClientError::InvalidId(_) => StatusCode::BAD_REQUEST,
        ClientError::Http { status: 404 | 410, .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Page { status, view } => return (status, Json(view)).into_response(),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match client_status(&err) {
            StatusCode::BAD_REQUEST => AppError::BadRequest(err.to_string()),
            StatusCode::NOT_FOUND => AppError::NotFound(err.to_string()),
            _ => AppError::BadGateway(err.to_string()),
        }
    }
}
