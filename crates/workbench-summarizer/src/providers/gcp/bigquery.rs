//! BigQuery streaming insert client
//!
//! Rows go through `tabledata.insertAll`, so they land in the streaming
//! buffer rather than a load job. Each row gets a fresh random `insertId`,
//! which only deduplicates retries of the same request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::auth::GcpAuth;
use crate::error::{Error, Result};
use crate::providers::table_sink::TableSink;
use crate::types::{OutputRow, RowError, TableRef};

const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com";

/// BigQuery REST client
pub struct BigQueryClient {
    auth: Arc<GcpAuth>,
    http: reqwest::Client,
    base_url: String,
}

impl BigQueryClient {
    /// Create a new BigQuery client
    pub fn new(auth: Arc<GcpAuth>) -> Self {
        Self {
            auth,
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Send requests to a custom base URL (emulators, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn insert_all_url(&self, table: &TableRef) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/datasets/{}/tables/{}/insertAll",
            self.base_url, table.project_id, table.dataset_id, table.table_id
        )
    }

    fn build_request(rows: &[OutputRow]) -> Result<InsertAllRequest> {
        let rows = rows
            .iter()
            .map(|row| {
                Ok(InsertAllRow {
                    insert_id: Uuid::new_v4().to_string(),
                    json: serde_json::to_value(row)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(InsertAllRequest { rows })
    }
}

#[async_trait]
impl TableSink for BigQueryClient {
    async fn insert_rows(&self, table: &TableRef, rows: &[OutputRow]) -> Result<Vec<RowError>> {
        let bearer = self.auth.bearer().await?;
        let request = Self::build_request(rows)?;

        let response = self
            .http
            .post(self.insert_all_url(table))
            .header(reqwest::header::AUTHORIZATION, bearer)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::bigquery(format!("insertAll request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::bigquery(format!(
                "insertAll into {} failed ({}): {}",
                table, status, body
            )));
        }

        let response: InsertAllResponse = response
            .json()
            .await
            .map_err(|e| Error::bigquery(format!("Failed to parse insertAll response: {}", e)))?;

        Ok(response.row_errors())
    }

    fn name(&self) -> &str {
        "bigquery"
    }
}

// ============================================================================
// API Request/Response types
// ============================================================================

#[derive(Serialize)]
struct InsertAllRequest {
    rows: Vec<InsertAllRow>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllRow {
    insert_id: String,
    json: serde_json::Value,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct InsertAllResponse {
    #[serde(default)]
    insert_errors: Vec<InsertErrors>,
}

#[derive(Deserialize)]
struct InsertErrors {
    #[serde(default)]
    index: u32,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[derive(Deserialize)]
struct ErrorProto {
    reason: Option<String>,
    location: Option<String>,
    message: Option<String>,
}

impl InsertAllResponse {
    /// Flatten into one entry per reported error
    fn row_errors(self) -> Vec<RowError> {
        self.insert_errors
            .into_iter()
            .flat_map(|entry| {
                let index = entry.index;
                entry.errors.into_iter().map(move |e| RowError {
                    index,
                    reason: e.reason,
                    location: e.location,
                    message: e.message,
                })
            })
            .collect()
    }
}
