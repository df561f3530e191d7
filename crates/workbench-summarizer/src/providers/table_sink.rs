//! Table sink provider trait for streaming row inserts

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{OutputRow, RowError, TableRef};

/// Trait for row-level appends to an analytic table
///
/// Implementations:
/// - `BigQueryClient`: BigQuery `tabledata.insertAll`
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Stream `rows` into `table`.
    ///
    /// `Ok` carries the per-row errors reported by the service (empty on
    /// success). `Err` means the call itself failed.
    async fn insert_rows(&self, table: &TableRef, rows: &[OutputRow]) -> Result<Vec<RowError>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
