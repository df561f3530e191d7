//! Core types for the summarizer pipeline

pub mod batch;
pub mod document;
pub mod event;
pub mod row;

pub use batch::{BatchProcessMetadata, BatchProcessRequest, BatchState, Operation};
pub use document::{Entity, ProcessedDocument};
pub use event::{StorageEvent, OBJECT_FINALIZED};
pub use row::{InsertOutcome, OutputRow, RowError, TableRef};
