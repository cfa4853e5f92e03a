//! Page controllers: per-resource create, detail/edit and search state
//!
//! Each request mounts a fresh controller around a typed `ResourceClient`,
//! drives one user action through it and renders the resulting view.
//! Failures never escape silently: the controller sets its error banner
//! and hands the cause back so the route can pick a status code.

mod create;
mod detail;
mod search;

use fhir_desk_core::{FormError, SearchError};
use thiserror::Error;

use crate::client::ClientError;

pub use create::{CreatePage, CreateView};
pub use detail::{DetailPage, DetailView};
pub use search::{ResultRow, SearchPage, SearchView};

/// User answer to "Are you sure you want to delete ...?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("No {0} ID provided")]
    MissingId(&'static str),

    #[error("No {0} loaded")]
    NotLoaded(&'static str),
}

/// Prompt shown before a delete is confirmed
pub fn delete_prompt(label: &str) -> String {
    format!(
        "Are you sure you want to delete this {}? This action cannot be undone.",
        label
    )
}

/// "patient" -> "Patient"
fn title(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
