//! Document AI batch processing wire types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Processor resource name, e.g.
/// `projects/{project_id}/locations/{location}/processors/{processor_id}`
pub fn processor_path(project_id: &str, location: &str, processor_id: &str) -> String {
    format!(
        "projects/{}/locations/{}/processors/{}",
        project_id, location, processor_id
    )
}

/// Processor version resource name, e.g.
/// `projects/{project_id}/locations/{location}/processors/{processor_id}/processorVersions/{version_id}`
pub fn processor_version_path(
    project_id: &str,
    location: &str,
    processor_id: &str,
    processor_version_id: &str,
) -> String {
    format!(
        "{}/processorVersions/{}",
        processor_path(project_id, location, processor_id),
        processor_version_id
    )
}

/// Request body of `{name}:batchProcess`. The target resource is in the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProcessRequest {
    pub input_documents: BatchDocumentsInputConfig,
    pub document_output_config: DocumentOutputConfig,
}

impl BatchProcessRequest {
    /// Request for a single GCS document, with results written under `output_uri`
    pub fn single(
        input_uri: impl Into<String>,
        mime_type: impl Into<String>,
        output_uri: impl Into<String>,
        field_mask: impl Into<String>,
    ) -> Self {
        Self {
            input_documents: BatchDocumentsInputConfig {
                gcs_documents: GcsDocuments {
                    documents: vec![GcsDocument {
                        gcs_uri: input_uri.into(),
                        mime_type: mime_type.into(),
                    }],
                },
            },
            document_output_config: DocumentOutputConfig {
                gcs_output_config: GcsOutputConfig {
                    gcs_uri: output_uri.into(),
                    field_mask: Some(field_mask.into()),
                },
            },
        }
    }

    /// Input document references
    pub fn documents(&self) -> &[GcsDocument] {
        &self.input_documents.gcs_documents.documents
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDocumentsInputConfig {
    pub gcs_documents: GcsDocuments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcsDocuments {
    pub documents: Vec<GcsDocument>,
}

/// One input document reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsDocument {
    pub gcs_uri: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOutputConfig {
    pub gcs_output_config: GcsOutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsOutputConfig {
    pub gcs_uri: String,
    /// Comma-separated field paths (JSON form of `google.protobuf.FieldMask`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_mask: Option<String>,
}

/// Long-running operation handle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<OperationStatus>,
}

impl Operation {
    /// Decode the batch metadata, if present
    pub fn batch_metadata(&self) -> Option<BatchProcessMetadata> {
        self.metadata
            .as_ref()
            .and_then(|m| serde_json::from_value(m.clone()).ok())
    }
}

/// `google.rpc.Status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Lifecycle state of a batch operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchState {
    #[default]
    StateUnspecified,
    Waiting,
    Running,
    Succeeded,
    Cancelling,
    Cancelled,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Metadata of a batch process operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProcessMetadata {
    #[serde(default)]
    pub state: BatchState,
    #[serde(default)]
    pub state_message: Option<String>,
    #[serde(default)]
    pub individual_process_statuses: Vec<IndividualProcessStatus>,
}

/// Per-input-document status: one per processed file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualProcessStatus {
    #[serde(default)]
    pub input_gcs_source: String,
    /// Format: `gs://BUCKET/PREFIX/OPERATION_NUMBER/INPUT_FILE_NUMBER/`
    #[serde(default)]
    pub output_gcs_destination: String,
    #[serde(default)]
    pub status: Option<OperationStatus>,
}

static GCS_URI: Lazy<Regex> = Lazy::new(|| Regex::new(r"^gs://(.*?)/(.*)$").unwrap());

/// Split a `gs://bucket/prefix` URI into bucket and prefix
pub fn split_gcs_uri(uri: &str) -> Option<(&str, &str)> {
    let caps = GCS_URI.captures(uri)?;
    let bucket = caps.get(1)?.as_str();
    if bucket.is_empty() {
        return None;
    }
    Some((bucket, caps.get(2).map(|m| m.as_str()).unwrap_or_default()))
}
