//! Configuration for the summarizer pipeline
//!
//! Everything is read from the process environment once at startup and then
//! passed into the handlers. Nothing is validated at load time: a required
//! setting that is missing only fails the operation that needs it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::batch::{processor_path, processor_version_path};
use crate::types::row::TableRef;

/// Default Document AI location
pub const DEFAULT_LOCATION: &str = "us";
/// Default MIME type of uploaded documents
pub const DEFAULT_MIME_TYPE: &str = "application/pdf";
/// Default output field mask for the processor
pub const DEFAULT_FIELD_MASK: &str = "text,entities,pages.pageNumber";

/// Top-level configuration for the server binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend provider (`BACKEND`: gcp or local)
    #[serde(default)]
    pub backend: BackendProvider,
    /// Root directory of the local object store (`LOCAL_STORAGE_DIR`)
    pub local_storage_dir: PathBuf,
    /// Pipeline settings shared by both handlers
    pub summarizer: SummarizerConfig,
    /// HTTP server settings
    pub server: ServerConfig,
    /// Credentials and API endpoint overrides
    pub gcp: GcpConfig,
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = non_empty(lookup);

        let backend = match lookup("BACKEND") {
            Some(raw) => BackendProvider::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown BACKEND '{}', using gcp", raw);
                BackendProvider::Gcp
            }),
            None => BackendProvider::Gcp,
        };

        Self {
            backend,
            local_storage_dir: lookup("LOCAL_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            summarizer: SummarizerConfig::from_lookup(&lookup),
            server: ServerConfig::from_lookup(&lookup),
            gcp: GcpConfig::from_lookup(&lookup),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Backend provider selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Document AI + Cloud Storage + BigQuery
    #[default]
    Gcp,
    /// Dry-run processor + filesystem storage + in-memory table
    Local,
}

impl BackendProvider {
    /// Parse a `BACKEND` value
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gcp" => Some(Self::Gcp),
            "local" => Some(Self::Local),
            _ => None,
        }
    }
}

/// Pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// GCP project id (`PROJECT_ID`)
    pub project_id: Option<String>,
    /// Document AI location (`LOCATION`, default "us")
    pub location: String,
    /// Document AI processor id (`PROCESSOR_ID`)
    pub processor_id: Option<String>,
    /// MIME type of uploaded documents (`MIME_TYPE`)
    pub mime_type: String,
    /// Output field mask (`FIELD_MASK`)
    pub field_mask: String,
    /// Processor version id (`PROCESSOR_VERSION_ID`)
    pub processor_version_id: Option<String>,
    /// GCS prefix the processor writes results to (`GCS_OUTPUT_URI`)
    pub gcs_output_uri: Option<String>,
    /// Destination dataset (`DATASET`), either `dataset` or `project.dataset`
    pub dataset: Option<String>,
    /// Destination table (`TABLE`)
    pub table: Option<String>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            location: DEFAULT_LOCATION.to_string(),
            processor_id: None,
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            field_mask: DEFAULT_FIELD_MASK.to_string(),
            processor_version_id: None,
            gcs_output_uri: None,
            dataset: None,
            table: None,
        }
    }
}

impl SummarizerConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            project_id: lookup("PROJECT_ID"),
            location: lookup("LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            processor_id: lookup("PROCESSOR_ID"),
            mime_type: lookup("MIME_TYPE").unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            field_mask: lookup("FIELD_MASK").unwrap_or_else(|| DEFAULT_FIELD_MASK.to_string()),
            processor_version_id: lookup("PROCESSOR_VERSION_ID"),
            gcs_output_uri: lookup("GCS_OUTPUT_URI"),
            dataset: lookup("DATASET"),
            table: lookup("TABLE"),
        }
    }

    /// Project id, or a configuration error when unset
    pub fn project_id(&self) -> Result<&str> {
        required(&self.project_id, "PROJECT_ID")
    }

    /// Processor id, or a configuration error when unset
    pub fn processor_id(&self) -> Result<&str> {
        required(&self.processor_id, "PROCESSOR_ID")
    }

    /// Output prefix, or a configuration error when unset
    pub fn gcs_output_uri(&self) -> Result<&str> {
        required(&self.gcs_output_uri, "GCS_OUTPUT_URI")
    }

    /// Full resource name of the target processor.
    ///
    /// The version-qualified name wins when a version id is configured.
    pub fn processor_name(&self) -> Result<String> {
        let project_id = self.project_id()?;
        let processor_id = self.processor_id()?;

        Ok(match self.processor_version_id.as_deref() {
            Some(version_id) => {
                processor_version_path(project_id, &self.location, processor_id, version_id)
            }
            None => processor_path(project_id, &self.location, processor_id),
        })
    }

    /// Destination table reference
    pub fn table_ref(&self) -> Result<TableRef> {
        let dataset = required(&self.dataset, "DATASET")?;
        let table = required(&self.table, "TABLE")?;
        TableRef::resolve(dataset, table, self.project_id.as_deref())
    }
}

/// Which handler is served at `/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionTarget {
    /// Submit uploaded documents for processing
    OnUpload,
    /// Persist processor output
    OnOutput,
}

impl FunctionTarget {
    /// Parse a `FUNCTION_TARGET` value
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "on_upload" => Some(Self::OnUpload),
            "on_output" => Some(Self::OnOutput),
            _ => None,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Handler mounted at the root path, if any
    pub function_target: Option<FunctionTarget>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            function_target: None,
        }
    }
}

impl ServerConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid PORT value '{}'", raw);
                defaults.port
            }),
            None => defaults.port,
        };

        let function_target = lookup("FUNCTION_TARGET").and_then(|raw| {
            let target = FunctionTarget::parse(&raw);
            if target.is_none() {
                tracing::warn!("Ignoring unknown FUNCTION_TARGET '{}'", raw);
            }
            target
        });

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            function_target,
        }
    }
}

/// Credentials and endpoint overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GcpConfig {
    /// Service account key file (`GOOGLE_APPLICATION_CREDENTIALS`).
    /// When unset, tokens come from the metadata server.
    pub credentials_path: Option<PathBuf>,
    /// Document AI base URL override (`DOCUMENT_AI_ENDPOINT`)
    pub document_ai_endpoint: Option<String>,
    /// BigQuery base URL override (`BIGQUERY_ENDPOINT`)
    pub bigquery_endpoint: Option<String>,
}

impl GcpConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            credentials_path: lookup("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            document_ai_endpoint: lookup("DOCUMENT_AI_ENDPOINT"),
            bigquery_endpoint: lookup("BIGQUERY_ENDPOINT"),
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value.as_deref().ok_or_else(|| Error::missing_setting(name))
}

/// Trim values; empty ones count as unset
fn non_empty<F>(lookup: F) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |key| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
