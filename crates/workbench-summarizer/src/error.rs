//! Error types for the summarizer pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing or unusable setting)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Trigger request could not be read as a storage event
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Authentication / token exchange error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Document AI request or operation error
    #[error("Document AI error: {0}")]
    DocumentAi(String),

    /// Cloud Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// BigQuery request error
    #[error("BigQuery error: {0}")]
    BigQuery(String),

    /// Processor output could not be parsed as a document
    #[error("Failed to parse document '{uri}': {message}")]
    DocumentParse { uri: String, message: String },

    /// Processed document carries no entities to read a summary from
    #[error("Document '{uri}' has no entities; no summary to extract")]
    NoEntities { uri: String },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a missing-setting configuration error
    pub fn missing_setting(name: &str) -> Self {
        Self::Config(format!("{} is not set", name))
    }

    /// Create a document parse error
    pub fn document_parse(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentParse {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Create a Document AI error
    pub fn document_ai(message: impl Into<String>) -> Self {
        Self::DocumentAi(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a BigQuery error
    pub fn bigquery(message: impl Into<String>) -> Self {
        Self::BigQuery(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Anything other than a malformed trigger request is reported as a
        // server-side failure so the trigger infrastructure may redeliver.
        let (status, error_type) = match &self {
            Error::InvalidEvent(_) => (StatusCode::BAD_REQUEST, "invalid_event"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Auth(_) => (StatusCode::INTERNAL_SERVER_ERROR, "auth_error"),
            Error::DocumentAi(_) => (StatusCode::BAD_GATEWAY, "document_ai_error"),
            Error::Storage(_) => (StatusCode::BAD_GATEWAY, "storage_error"),
            Error::BigQuery(_) => (StatusCode::BAD_GATEWAY, "bigquery_error"),
            Error::DocumentParse { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "parse_error"),
            Error::NoEntities { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "no_entities"),
            Error::Json(_) => (StatusCode::INTERNAL_SERVER_ERROR, "json_error"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        tracing::error!(error_type, "Handler failed: {}", self);

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
