//! Upload handler: submit new documents to the processor

use serde::Serialize;
use std::sync::Arc;

use super::{skip_unless_finalized, HandlerOutcome};
use crate::config::SummarizerConfig;
use crate::error::Result;
use crate::providers::DocumentProcessor;
use crate::types::{BatchProcessRequest, Operation, StorageEvent};

/// Accepted batch submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    /// Processor resource the request was sent to
    pub processor_name: String,
    /// Input document URI
    pub input_uri: String,
    /// Operation handle returned by the processor
    pub operation: Operation,
}

/// Submits each uploaded document as a batch process operation
pub struct IngestHandler {
    config: Arc<SummarizerConfig>,
    processor: Arc<dyn DocumentProcessor>,
}

impl IngestHandler {
    pub fn new(config: Arc<SummarizerConfig>, processor: Arc<dyn DocumentProcessor>) -> Self {
        Self { config, processor }
    }

    /// Target processor and request body for an uploaded object
    pub fn build_request(&self, event: &StorageEvent) -> Result<(String, BatchProcessRequest)> {
        let processor_name = self.config.processor_name()?;
        let request = BatchProcessRequest::single(
            event.gcs_uri(),
            self.config.mime_type.clone(),
            self.config.gcs_output_uri()?,
            self.config.field_mask.clone(),
        );
        Ok((processor_name, request))
    }

    /// Handle an upload notification.
    ///
    /// Returns once the processor has accepted the operation; its completion
    /// surfaces later as an output-file event.
    pub async fn handle(&self, event: &StorageEvent) -> Result<HandlerOutcome<Submission>> {
        if let Some(skipped) = skip_unless_finalized(event, "on_upload") {
            return Ok(skipped);
        }

        let input_uri = event.gcs_uri();
        tracing::info!(
            event_id = event.id.as_deref().unwrap_or(""),
            input_uri = %input_uri,
            config = ?self.config,
            "Received upload"
        );

        let (processor_name, request) = self.build_request(event)?;
        let operation = self.processor.batch_process(&processor_name, &request).await?;

        tracing::info!(
            operation = %operation.name,
            processor = %processor_name,
            metadata = ?operation.metadata,
            "on_upload finished; batch operation started"
        );

        Ok(HandlerOutcome::Completed(Submission {
            processor_name,
            input_uri,
            operation,
        }))
    }
}
