//! Error taxonomy for the analysis pipeline.
//!
//! Three kinds of failure exist: the document could not be turned into text
//! ([`ExtractionError`]), the provider call failed ([`ProviderError`]), or the
//! provider answered with something that does not satisfy the declared schema
//! ([`SchemaViolation`]). [`AnalysisError`] unifies them for the invoker.

use thiserror::Error;

use crate::report::RuleStatus;

/// Failures of the text source adapter, plus the empty-text guard used before
/// any provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("No document supplied")]
    NoInput,

    #[error("Not a well-formed PDF document: {0}")]
    Malformed(String),

    #[error("Document contains no extractable text")]
    NoText,

    #[error("Document text is empty; load a document before running an analysis")]
    EmptyText,
}

/// Provider-side failures: transport, auth, quota, or any other non-success answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Provider rejected the API key ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("Provider quota or rate limit exceeded: {0}")]
    QuotaExceeded(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Provider returned no message content")]
    EmptyResponse,
}

impl ProviderError {
    /// Classify a non-success HTTP status and its body.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ProviderError::Unauthorized { status, body },
            429 => ProviderError::QuotaExceeded(body),
            _ => ProviderError::Api { status, body },
        }
    }
}

/// Ways a structured response can fail client-side validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("JSON parse error: {0}")]
    InvalidJson(String),

    #[error("Unexpected response structure: {0}")]
    UnexpectedShape(String),

    #[error("Missing required field `{0}`")]
    MissingField(String),

    #[error("Undeclared field `{0}`")]
    UnknownField(String),

    #[error("Invalid status `{0}`, expected `pass` or `fail`")]
    InvalidStatus(String),

    #[error("Confidence {0} is not an integer in [0, 100]")]
    ConfidenceOutOfRange(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Schema validation failed: {0}")]
    SchemaValidation(#[from] SchemaViolation),
}

impl AnalysisError {
    /// Sentinel status used for placeholder rule checks produced from this error.
    ///
    /// A parseable response with the wrong structure is `unknown`; every other
    /// failure is `error`.
    pub fn sentinel_status(&self) -> RuleStatus {
        match self {
            AnalysisError::SchemaValidation(SchemaViolation::UnexpectedShape(_)) => {
                RuleStatus::Unknown
            }
            _ => RuleStatus::Error,
        }
    }

    /// Evidence text written into placeholder rule checks.
    pub fn sentinel_evidence(&self) -> String {
        match self {
            AnalysisError::SchemaValidation(SchemaViolation::UnexpectedShape(_)) => {
                "Could not parse".to_string()
            }
            AnalysisError::SchemaValidation(SchemaViolation::InvalidJson(msg)) => {
                format!("JSON parse error: {msg}")
            }
            AnalysisError::Provider(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}
