//! In-memory providers with call recording and scripted failures

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use workbench_summarizer::config::AppConfig;
use workbench_summarizer::providers::{DocumentProcessor, ObjectInfo, ObjectStore, TableSink};
use workbench_summarizer::types::{BatchProcessRequest, Operation, OutputRow, RowError, TableRef};
use workbench_summarizer::{Error, Result};

/// Config with every pipeline setting filled in
pub fn config(pairs: &[(&str, &str)]) -> AppConfig {
    let mut env: HashMap<String, String> = [
        ("PROJECT_ID", "proj"),
        ("PROCESSOR_ID", "abc123"),
        ("GCS_OUTPUT_URI", "gs://summaries-out/"),
        ("DATASET", "docs"),
        ("TABLE", "summaries"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in pairs {
        env.insert(k.to_string(), v.to_string());
    }
    AppConfig::from_lookup(|key| env.get(key).cloned())
}

#[derive(Default)]
pub struct RecordingProcessor {
    pub submissions: Mutex<Vec<(String, BatchProcessRequest)>>,
    pub operation_reads: AtomicUsize,
    pub fail_with: Option<String>,
    pub operation: Mutex<Option<Operation>>,
}

impl RecordingProcessor {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_operation(operation: Operation) -> Self {
        Self {
            operation: Mutex::new(Some(operation)),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.submissions.lock().len() + self.operation_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentProcessor for RecordingProcessor {
    async fn batch_process(
        &self,
        processor_name: &str,
        request: &BatchProcessRequest,
    ) -> Result<Operation> {
        self.submissions
            .lock()
            .push((processor_name.to_string(), request.clone()));

        if let Some(ref message) = self.fail_with {
            return Err(Error::document_ai(message.clone()));
        }

        Ok(Operation {
            name: "projects/proj/locations/us/operations/42".to_string(),
            metadata: Some(serde_json::json!({"state": "RUNNING"})),
            ..Default::default()
        })
    }

    async fn get_operation(&self, operation_name: &str) -> Result<Operation> {
        self.operation_reads.fetch_add(1, Ordering::SeqCst);
        self.operation
            .lock()
            .clone()
            .ok_or_else(|| Error::document_ai(format!("unknown operation {}", operation_name)))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Object store keyed by `(bucket, name)`
#[derive(Default)]
pub struct MapObjectStore {
    objects: Mutex<HashMap<(String, String), (Vec<u8>, String)>>,
    pub downloads: AtomicUsize,
    pub lists: AtomicUsize,
}

impl MapObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, bucket: &str, name: &str, content_type: &str, bytes: impl Into<Vec<u8>>) {
        self.objects.lock().insert(
            (bucket.to_string(), name.to_string()),
            (bytes.into(), content_type.to_string()),
        );
    }

    pub fn put_json(&self, bucket: &str, name: &str, value: serde_json::Value) {
        self.put(bucket, name, "application/json", value.to_string());
    }

    pub fn calls(&self) -> usize {
        self.downloads.load(Ordering::SeqCst) + self.lists.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MapObjectStore {
    async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .get(&(bucket.to_string(), object.to_string()))
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| Error::storage(format!("No such object: gs://{}/{}", bucket, object)))
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let mut objects: Vec<ObjectInfo> = self
            .objects
            .lock()
            .iter()
            .filter(|((b, name), _)| b == bucket && name.starts_with(prefix))
            .map(|((b, name), (_, content_type))| ObjectInfo {
                bucket: b.clone(),
                name: name.clone(),
                content_type: Some(content_type.clone()),
            })
            .collect();
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    fn name(&self) -> &str {
        "map"
    }
}

/// Table sink that records every call and replies with scripted row errors
#[derive(Default)]
pub struct ScriptedSink {
    pub calls: Mutex<Vec<(TableRef, Vec<OutputRow>)>>,
    pub row_errors: Vec<RowError>,
}

impl ScriptedSink {
    pub fn with_row_errors(row_errors: Vec<RowError>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            row_errors,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl TableSink for ScriptedSink {
    async fn insert_rows(&self, table: &TableRef, rows: &[OutputRow]) -> Result<Vec<RowError>> {
        self.calls.lock().push((table.clone(), rows.to_vec()));
        Ok(self.row_errors.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn row_error(reason: &str, message: &str) -> RowError {
    RowError {
        index: 0,
        reason: Some(reason.to_string()),
        location: Some("summary".to_string()),
        message: Some(message.to_string()),
    }
}

pub fn summarized_document(text: &str, summaries: &[&str]) -> serde_json::Value {
    let entities: Vec<serde_json::Value> = summaries
        .iter()
        .map(|s| serde_json::json!({"type": "summary", "normalizedValue": {"text": s}}))
        .collect();
    serde_json::json!({
        "mimeType": "application/pdf",
        "text": text,
        "entities": entities,
        "pages": [{"pageNumber": 1}]
    })
}
