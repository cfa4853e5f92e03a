use serde::{Deserialize, Serialize};

/// Severity of the issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

/// FHIR OperationOutcome, as returned in error response bodies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,

    #[serde(default)]
    pub issue: Vec<OperationOutcomeIssue>,
}

/// Single issue within an OperationOutcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,

    /// Issue type code; kept as a string since servers may use any code
    /// from the IssueType value set
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

impl OperationOutcome {
    /// Parse an error body, returning `None` when it is not an OperationOutcome
    pub fn from_body(body: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .filter(|outcome| outcome.resource_type == "OperationOutcome")
    }

    /// Diagnostics of the first error-or-worse issue, else of the first issue
    pub fn diagnostics(&self) -> Option<&str> {
        self.issue
            .iter()
            .find(|i| matches!(i.severity, IssueSeverity::Fatal | IssueSeverity::Error))
            .or_else(|| self.issue.first())
            .and_then(|i| i.diagnostics.as_deref())
    }
}
