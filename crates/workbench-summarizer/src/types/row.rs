//! Destination table rows

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// One summary row: appended per processed output file, never updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    pub output_file_uri: String,
    pub extracted_text: String,
    pub summary: String,
}

impl OutputRow {
    pub fn new(
        output_file_uri: impl Into<String>,
        extracted_text: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            output_file_uri: output_file_uri.into(),
            extracted_text: extracted_text.into(),
            summary: summary.into(),
        }
    }
}

/// Fully-qualified BigQuery table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl TableRef {
    /// Resolve `{dataset}.{table}`.
    ///
    /// `dataset` is either a bare dataset id, which takes its project from
    /// `default_project`, or `project.dataset`.
    pub fn resolve(dataset: &str, table: &str, default_project: Option<&str>) -> Result<Self> {
        let (project_id, dataset_id) = match dataset.split_once('.') {
            Some((project, dataset)) => (project.to_string(), dataset.to_string()),
            None => (
                default_project
                    .ok_or_else(|| Error::missing_setting("PROJECT_ID"))?
                    .to_string(),
                dataset.to_string(),
            ),
        };

        if project_id.is_empty() || dataset_id.is_empty() || table.is_empty() || dataset_id.contains('.') {
            return Err(Error::Config(format!(
                "Invalid table id '{}.{}'",
                dataset, table
            )));
        }

        Ok(Self {
            project_id,
            dataset_id,
            table_id: table.to_string(),
        })
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

/// Error reported by the table service for one inserted row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    /// Index of the row in the insert request
    pub index: u32,
    pub reason: Option<String>,
    pub location: Option<String>,
    pub message: Option<String>,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: {} ({}) at '{}'",
            self.index,
            self.message.as_deref().unwrap_or("unknown error"),
            self.reason.as_deref().unwrap_or("unspecified"),
            self.location.as_deref().unwrap_or("")
        )
    }
}

/// Result of a streaming insert
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertOutcome {
    /// Number of rows sent
    pub rows: usize,
    /// Per-row errors; empty means every row was accepted
    pub errors: Vec<RowError>,
}

impl InsertOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
