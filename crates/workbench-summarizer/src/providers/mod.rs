//! Provider abstractions for the external services the pipeline talks to
//!
//! Handlers depend only on these traits. The GCP implementations live in
//! [`gcp`], filesystem and in-memory ones in [`local`].

pub mod document_processor;
pub mod gcp;
pub mod local;
pub mod object_store;
pub mod table_sink;

pub use document_processor::DocumentProcessor;
pub use object_store::{ObjectInfo, ObjectStore};
pub use table_sink::TableSink;
