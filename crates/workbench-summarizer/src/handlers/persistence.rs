//! Summary persistence

use std::sync::Arc;

use crate::error::Result;
use crate::providers::TableSink;
use crate::types::{InsertOutcome, OutputRow, TableRef};

/// Writes summary rows to the destination table
pub struct Persistence {
    sink: Arc<dyn TableSink>,
}

impl Persistence {
    pub fn new(sink: Arc<dyn TableSink>) -> Self {
        Self { sink }
    }

    /// Insert exactly one row.
    ///
    /// Row-level errors reported by the table service are logged and returned
    /// in the outcome, not raised. Only a failure of the insert call itself is
    /// an error.
    pub async fn save(
        &self,
        table: &TableRef,
        file_uri: &str,
        extracted_text: &str,
        summary: &str,
    ) -> Result<InsertOutcome> {
        tracing::info!(table = %table, sink = self.sink.name(), file_uri, "Saving summary row");

        let rows = [OutputRow::new(file_uri, extracted_text, summary)];
        let errors = self.sink.insert_rows(table, &rows).await?;

        if errors.is_empty() {
            tracing::info!(table = %table, "New rows have been added");
        } else {
            for error in &errors {
                tracing::warn!(table = %table, file_uri, "Row insert error: {}", error);
            }
            tracing::warn!(
                table = %table,
                count = errors.len(),
                "Encountered errors while inserting rows"
            );
        }

        Ok(InsertOutcome {
            rows: rows.len(),
            errors,
        })
    }
}
