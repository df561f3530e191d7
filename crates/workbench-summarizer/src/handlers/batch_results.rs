//! Batch result enumeration
//!
//! Inspects a finished batch operation: every input document's output
//! folder is listed and each JSON shard parsed. The operation is read once;
//! an unfinished operation is reported as-is rather than waited on.

use serde::Serialize;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{DocumentProcessor, ObjectStore};
use crate::types::batch::split_gcs_uri;
use crate::types::{BatchState, ProcessedDocument};

/// One parsed output shard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutput {
    /// Input document the shard belongs to
    pub input_uri: String,
    /// Output JSON object
    pub output_uri: String,
    /// Length of the extracted text in characters
    pub text_chars: usize,
    pub pages: usize,
    /// First entity's normalized value; `None` when the shard has no entities
    pub summary: Option<String>,
}

/// Report for one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub operation: String,
    pub state: BatchState,
    pub outputs: Vec<BatchOutput>,
    /// Output destinations that could not be parsed as `gs://` URIs
    pub skipped_destinations: Vec<String>,
}

/// Collects the output documents of a batch operation
pub struct BatchResultCollector {
    processor: Arc<dyn DocumentProcessor>,
    store: Arc<dyn ObjectStore>,
}

impl BatchResultCollector {
    pub fn new(processor: Arc<dyn DocumentProcessor>, store: Arc<dyn ObjectStore>) -> Self {
        Self { processor, store }
    }

    /// Read the operation and, if it succeeded, every output document.
    ///
    /// A failed or cancelled operation is an error carrying its state message.
    pub async fn collect(&self, operation_name: &str) -> Result<BatchReport> {
        let operation = self.processor.get_operation(operation_name).await?;

        if let Some(ref status) = operation.error {
            return Err(Error::document_ai(format!(
                "Batch process failed: {} (code {})",
                status.message, status.code
            )));
        }

        let metadata = operation.batch_metadata().unwrap_or_default();
        let mut report = BatchReport {
            operation: operation.name.clone(),
            state: metadata.state,
            outputs: Vec::new(),
            skipped_destinations: Vec::new(),
        };

        match metadata.state {
            BatchState::Succeeded => {}
            BatchState::Failed | BatchState::Cancelled => {
                return Err(Error::document_ai(format!(
                    "Batch process failed: {}",
                    metadata.state_message.unwrap_or_default()
                )));
            }
            state => {
                tracing::info!(operation = %operation.name, ?state, "Batch operation not finished");
                return Ok(report);
            }
        }

        // One status per input document
        for process in &metadata.individual_process_statuses {
            let Some((bucket, prefix)) = split_gcs_uri(&process.output_gcs_destination) else {
                tracing::warn!(
                    destination = %process.output_gcs_destination,
                    "Could not parse output GCS destination"
                );
                report
                    .skipped_destinations
                    .push(process.output_gcs_destination.clone());
                continue;
            };

            // Document AI may write several JSON shards per input document
            for object in self.store.list(bucket, prefix).await? {
                if object.content_type.as_deref() != Some("application/json") {
                    tracing::info!(
                        object = %object.name,
                        content_type = object.content_type.as_deref().unwrap_or(""),
                        "Skipping non-supported file"
                    );
                    continue;
                }

                let output_uri = object.uri();
                tracing::info!(object = %object.name, "Fetching output shard");
                let bytes = self.store.download(&object.bucket, &object.name).await?;
                let document = ProcessedDocument::from_json(&bytes, &output_uri)?;

                report.outputs.push(BatchOutput {
                    input_uri: process.input_gcs_source.clone(),
                    text_chars: document.text().chars().count(),
                    pages: document.pages.len(),
                    summary: document.summary(&output_uri).ok().map(str::to_string),
                    output_uri,
                });
            }
        }

        Ok(report)
    }
}
