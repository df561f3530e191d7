//! Local provider implementations
//!
//! Filesystem object storage, a dry-run processor and an in-memory table let
//! the server run end-to-end without cloud access.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::{BatchProcessRequest, Operation, OutputRow, RowError, TableRef};

use super::document_processor::DocumentProcessor;
use super::object_store::{ObjectInfo, ObjectStore};
use super::table_sink::TableSink;

/// Object store backed by a directory: `{root}/{bucket}/{object}`
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            return Err(Error::storage(format!("Invalid bucket name '{}'", bucket)));
        }
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, object: &str) -> Result<PathBuf> {
        if object.split('/').any(|part| part == "..") {
            return Err(Error::storage(format!("Invalid object name '{}'", object)));
        }
        Ok(self.bucket_dir(bucket)?.join(object))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, object)?;
        tokio::fs::read(&path).await.map_err(|e| {
            Error::storage(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let bucket_dir = self.bucket_dir(bucket)?;
        let bucket_name = bucket.to_string();
        let prefix = prefix.to_string();

        tokio::task::spawn_blocking(move || list_dir(&bucket_dir, &bucket_name, &prefix))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &str {
        "local"
    }
}

fn list_dir(bucket_dir: &Path, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
    if !bucket_dir.exists() {
        return Ok(Vec::new());
    }

    let mut objects = Vec::new();
    for entry in WalkDir::new(bucket_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::storage(format!("Failed to list {}: {}", bucket_dir.display(), e)))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(bucket_dir) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if !name.starts_with(prefix) {
            continue;
        }

        objects.push(ObjectInfo {
            bucket: bucket.to_string(),
            content_type: Some(mime_guess::from_path(&name).first_or_octet_stream().to_string()),
            name,
        });
    }

    Ok(objects)
}

/// Processor that records submissions instead of sending them
#[derive(Default)]
pub struct DryRunProcessor {
    submissions: Mutex<Vec<(String, BatchProcessRequest)>>,
}

impl DryRunProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every submission so far, as `(processor_name, request)`
    pub fn submissions(&self) -> Vec<(String, BatchProcessRequest)> {
        self.submissions.lock().clone()
    }
}

#[async_trait]
impl DocumentProcessor for DryRunProcessor {
    async fn batch_process(
        &self,
        processor_name: &str,
        request: &BatchProcessRequest,
    ) -> Result<Operation> {
        self.submissions
            .lock()
            .push((processor_name.to_string(), request.clone()));

        let location = processor_name.split('/').nth(3).unwrap_or("us");
        let project = processor_name.split('/').nth(1).unwrap_or("local");
        Ok(Operation {
            name: format!("projects/{}/locations/{}/operations/{}", project, location, Uuid::new_v4()),
            ..Default::default()
        })
    }

    async fn get_operation(&self, operation_name: &str) -> Result<Operation> {
        Err(Error::document_ai(format!(
            "Operation {} is not tracked by the dry-run processor",
            operation_name
        )))
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

/// Append-only in-memory table
#[derive(Default)]
pub struct MemoryTableSink {
    rows: Mutex<Vec<(TableRef, OutputRow)>>,
}

impl MemoryTableSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored row, in insertion order
    pub fn rows(&self) -> Vec<(TableRef, OutputRow)> {
        self.rows.lock().clone()
    }
}

#[async_trait]
impl TableSink for MemoryTableSink {
    async fn insert_rows(&self, table: &TableRef, rows: &[OutputRow]) -> Result<Vec<RowError>> {
        let mut stored = self.rows.lock();
        stored.extend(rows.iter().cloned().map(|row| (table.clone(), row)));
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
