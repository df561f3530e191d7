//! Output handler: persist the summary of a processed document

use serde::Serialize;
use std::sync::Arc;

use super::persistence::Persistence;
use super::{skip_unless_finalized, HandlerOutcome};
use crate::config::SummarizerConfig;
use crate::error::Result;
use crate::providers::ObjectStore;
use crate::types::{InsertOutcome, ProcessedDocument, StorageEvent};

/// What was written for one output file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSummary {
    pub output_file_uri: String,
    pub summary: String,
    /// Length of the extracted text in characters
    pub text_chars: usize,
    pub insert: InsertOutcome,
}

/// Reads processor output files and stores their summaries
pub struct ResultHandler {
    config: Arc<SummarizerConfig>,
    store: Arc<dyn ObjectStore>,
    persistence: Persistence,
}

impl ResultHandler {
    pub fn new(
        config: Arc<SummarizerConfig>,
        store: Arc<dyn ObjectStore>,
        persistence: Persistence,
    ) -> Self {
        Self {
            config,
            store,
            persistence,
        }
    }

    /// Handle an output-file notification.
    ///
    /// Every invocation appends one row, so a redelivered event produces a
    /// duplicate.
    pub async fn handle(&self, event: &StorageEvent) -> Result<HandlerOutcome<StoredSummary>> {
        if let Some(skipped) = skip_unless_finalized(event, "on_output") {
            return Ok(skipped);
        }

        let file_uri = event.gcs_uri();
        let table = self.config.table_ref()?;

        tracing::info!(
            event_id = event.id.as_deref().unwrap_or(""),
            file_uri = %file_uri,
            store = self.store.name(),
            "Fetching processor output"
        );

        let bytes = self.store.download(&event.data.bucket, &event.data.name).await?;
        let document = ProcessedDocument::from_json(&bytes, &file_uri)?;

        let extracted_text = document.text();
        let summary = document.summary(&file_uri)?;

        tracing::debug!(
            file_uri = %file_uri,
            entities = document.entities.len(),
            pages = document.pages.len(),
            "Parsed processed document"
        );

        let insert = self
            .persistence
            .save(&table, &file_uri, extracted_text, summary)
            .await?;

        Ok(HandlerOutcome::Completed(StoredSummary {
            summary: summary.to_string(),
            text_chars: extracted_text.chars().count(),
            output_file_uri: file_uri,
            insert,
        }))
    }
}
