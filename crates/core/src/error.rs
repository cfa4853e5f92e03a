use thiserror::Error;

/// Rejected form mutation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    #[error("Invalid value for field {field}: expected {expected}")]
    InvalidValue {
        field: String,
        expected: &'static str,
    },

    #[error("No repeated entry with key {0}")]
    UnknownEntry(String),
}

/// Search criteria that cannot be sent
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Please enter at least one search criteria")]
    NoCriteria,
}
