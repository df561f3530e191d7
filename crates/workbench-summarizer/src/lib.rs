//! workbench-summarizer: Document AI summarization pipeline
//!
//! Two storage-triggered handlers: uploads are submitted to a Document AI
//! summarizer processor as batch operations, and the processor's output files
//! are parsed and their text and summary streamed into a BigQuery table.

pub mod config;
pub mod error;
pub mod handlers;
pub mod providers;
pub mod server;
pub mod types;

pub use config::{AppConfig, SummarizerConfig};
pub use error::{Error, Result};
pub use handlers::{HandlerOutcome, IngestHandler, Persistence, ResultHandler};
pub use types::{
    document::ProcessedDocument,
    event::StorageEvent,
    row::{OutputRow, TableRef},
};
