//! Google Cloud Platform provider implementations
//!
//! - Document AI for batch document processing
//! - Cloud Storage for reading processor output
//! - BigQuery for streaming summary rows

mod auth;
mod bigquery;
mod document_ai;
mod gcs_store;

pub use auth::GcpAuth;
pub use bigquery::BigQueryClient;
pub use document_ai::DocumentAiClient;
pub use gcs_store::GcsObjectStore;
