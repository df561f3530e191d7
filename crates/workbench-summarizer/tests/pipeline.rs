//! End-to-end handler tests against in-memory providers

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{config, row_error, summarized_document, MapObjectStore, RecordingProcessor, ScriptedSink};
use workbench_summarizer::handlers::{BatchResultCollector, IngestHandler, Persistence, ResultHandler};
use workbench_summarizer::providers::local::MemoryTableSink;
use workbench_summarizer::providers::TableSink;
use workbench_summarizer::types::batch::{IndividualProcessStatus, OperationStatus};
use workbench_summarizer::types::{BatchState, Operation};
use workbench_summarizer::{AppConfig, Error, StorageEvent};

fn ingest(config: &AppConfig, processor: &Arc<RecordingProcessor>) -> IngestHandler {
    IngestHandler::new(Arc::new(config.summarizer.clone()), processor.clone())
}

fn result_handler(
    config: &AppConfig,
    store: &Arc<MapObjectStore>,
    sink: Arc<dyn TableSink>,
) -> ResultHandler {
    ResultHandler::new(
        Arc::new(config.summarizer.clone()),
        store.clone(),
        Persistence::new(sink),
    )
}

#[tokio::test]
async fn test_non_finalized_events_touch_nothing() {
    let config = config(&[]);
    let processor = Arc::new(RecordingProcessor::default());
    let store = Arc::new(MapObjectStore::new());
    let sink = Arc::new(ScriptedSink::default());

    let deleted = StorageEvent::new("google.cloud.storage.object.v1.deleted", "b", "n.pdf");

    let upload = ingest(&config, &processor).handle(&deleted).await.unwrap();
    assert!(upload.is_skipped());

    let output = result_handler(&config, &store, sink.clone())
        .handle(&deleted)
        .await
        .unwrap();
    assert!(output.is_skipped());

    assert_eq!(processor.calls(), 0);
    assert_eq!(store.calls(), 0);
    assert_eq!(sink.call_count(), 0);
}

#[tokio::test]
async fn test_upload_submits_single_document() {
    let config = config(&[]);
    let processor = Arc::new(RecordingProcessor::default());

    let outcome = ingest(&config, &processor)
        .handle(&StorageEvent::finalized("b", "n"))
        .await
        .unwrap();
    let submission = outcome.completed().unwrap();

    assert_eq!(submission.input_uri, "gs://b/n");
    assert_eq!(
        submission.operation.name,
        "projects/proj/locations/us/operations/42"
    );

    let submissions = processor.submissions.lock();
    assert_eq!(submissions.len(), 1);

    let (processor_name, request) = &submissions[0];
    assert_eq!(processor_name, "projects/proj/locations/us/processors/abc123");

    let documents = request.documents();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].gcs_uri, "gs://b/n");
    assert_eq!(documents[0].mime_type, "application/pdf");

    let output = &request.document_output_config.gcs_output_config;
    assert_eq!(output.gcs_uri, "gs://summaries-out/");
    assert_eq!(output.field_mask.as_deref(), Some("text,entities,pages.pageNumber"));
}

#[tokio::test]
async fn test_upload_targets_processor_version() {
    let config = config(&[("PROCESSOR_VERSION_ID", "v7"), ("LOCATION", "eu")]);
    let processor = Arc::new(RecordingProcessor::default());

    ingest(&config, &processor)
        .handle(&StorageEvent::finalized("b", "n"))
        .await
        .unwrap();

    let submissions = processor.submissions.lock();
    assert_eq!(
        submissions[0].0,
        "projects/proj/locations/eu/processors/abc123/processorVersions/v7"
    );
}

#[tokio::test]
async fn test_upload_propagates_submission_failure() {
    let config = config(&[]);
    let processor = Arc::new(RecordingProcessor::failing("PERMISSION_DENIED"));

    let err = ingest(&config, &processor)
        .handle(&StorageEvent::finalized("b", "n"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DocumentAi(_)));
    assert_eq!(processor.submissions.lock().len(), 1);
}

#[tokio::test]
async fn test_upload_without_processor_id_makes_no_call() {
    let config = AppConfig::from_lookup(|key| match key {
        "PROJECT_ID" => Some("proj".to_string()),
        "GCS_OUTPUT_URI" => Some("gs://out/".to_string()),
        _ => None,
    });
    let processor = Arc::new(RecordingProcessor::default());

    let err = ingest(&config, &processor)
        .handle(&StorageEvent::finalized("b", "n"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(ref m) if m.contains("PROCESSOR_ID")));
    assert_eq!(processor.calls(), 0);
}

#[tokio::test]
async fn test_output_stores_text_and_first_summary() {
    let config = config(&[]);
    let store = Arc::new(MapObjectStore::new());
    store.put_json(
        "summaries-out",
        "123/0/doc-0.json",
        summarized_document("Hello world", &["Summary A", "Summary B"]),
    );
    let sink = Arc::new(ScriptedSink::default());

    let outcome = result_handler(&config, &store, sink.clone())
        .handle(&StorageEvent::finalized("summaries-out", "123/0/doc-0.json"))
        .await
        .unwrap();
    let stored = outcome.completed().unwrap();

    assert_eq!(stored.summary, "Summary A");
    assert_eq!(stored.text_chars, 11);
    assert!(stored.insert.is_success());

    let calls = sink.calls.lock();
    assert_eq!(calls.len(), 1);

    let (table, rows) = &calls[0];
    assert_eq!(table.to_string(), "proj.docs.summaries");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].output_file_uri, "gs://summaries-out/123/0/doc-0.json");
    assert_eq!(rows[0].extracted_text, "Hello world");
    assert_eq!(rows[0].summary, "Summary A");
}

#[tokio::test]
async fn test_output_uses_qualified_dataset_project() {
    let config = config(&[("DATASET", "warehouse.docs")]);
    let store = Arc::new(MapObjectStore::new());
    store.put_json("o", "doc.json", summarized_document("t", &["s"]));
    let sink = Arc::new(ScriptedSink::default());

    result_handler(&config, &store, sink.clone())
        .handle(&StorageEvent::finalized("o", "doc.json"))
        .await
        .unwrap();

    assert_eq!(sink.calls.lock()[0].0.to_string(), "warehouse.docs.summaries");
}

#[tokio::test]
async fn test_output_without_entities_inserts_nothing() {
    let config = config(&[]);
    let store = Arc::new(MapObjectStore::new());
    store.put_json("o", "doc.json", summarized_document("Hello world", &[]));
    let sink = Arc::new(ScriptedSink::default());

    let err = result_handler(&config, &store, sink.clone())
        .handle(&StorageEvent::finalized("o", "doc.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoEntities { ref uri } if uri == "gs://o/doc.json"));
    assert_eq!(sink.call_count(), 0);
}

#[tokio::test]
async fn test_row_errors_are_reported_not_raised() {
    let config = config(&[]);
    let store = Arc::new(MapObjectStore::new());
    store.put_json("o", "doc.json", summarized_document("Hello world", &["Summary A"]));
    let sink = Arc::new(ScriptedSink::with_row_errors(vec![
        row_error("invalid", "no such field: summary"),
        row_error("stopped", ""),
    ]));

    let outcome = result_handler(&config, &store, sink.clone())
        .handle(&StorageEvent::finalized("o", "doc.json"))
        .await
        .unwrap();
    let stored = outcome.completed().unwrap();

    assert!(!stored.insert.is_success());
    assert_eq!(stored.insert.rows, 1);
    assert_eq!(stored.insert.errors.len(), 2);

    let calls = sink.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.len(), 1);
}

#[tokio::test]
async fn test_redelivered_event_appends_duplicate_row() {
    let config = config(&[]);
    let store = Arc::new(MapObjectStore::new());
    store.put_json("o", "doc.json", summarized_document("Hello world", &["Summary A"]));
    let sink = Arc::new(MemoryTableSink::new());
    let handler = result_handler(&config, &store, sink.clone());

    let event = StorageEvent::finalized("o", "doc.json");
    handler.handle(&event).await.unwrap();
    handler.handle(&event).await.unwrap();

    let rows = sink.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].1, rows[1].1);
}

#[tokio::test]
async fn test_output_propagates_fetch_failure() {
    let config = config(&[]);
    let store = Arc::new(MapObjectStore::new());
    let sink = Arc::new(ScriptedSink::default());

    let err = result_handler(&config, &store, sink.clone())
        .handle(&StorageEvent::finalized("o", "missing.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(sink.call_count(), 0);
}

#[tokio::test]
async fn test_output_propagates_parse_failure() {
    let config = config(&[]);
    let store = Arc::new(MapObjectStore::new());
    store.put("o", "doc.json", "application/json", "{ not json");
    let sink = Arc::new(ScriptedSink::default());

    let err = result_handler(&config, &store, sink.clone())
        .handle(&StorageEvent::finalized("o", "doc.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DocumentParse { ref uri, .. } if uri == "gs://o/doc.json"));
    assert_eq!(sink.call_count(), 0);
}

#[tokio::test]
async fn test_upload_then_output_flow() {
    let config = config(&[]);
    let processor = Arc::new(RecordingProcessor::default());
    let store = Arc::new(MapObjectStore::new());
    let sink = Arc::new(MemoryTableSink::new());

    let submission = ingest(&config, &processor)
        .handle(&StorageEvent::finalized("uploads", "report.pdf"))
        .await
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(submission.input_uri, "gs://uploads/report.pdf");

    // The processor writes its output under the configured prefix
    store.put_json(
        "summaries-out",
        "42/0/report-0.json",
        summarized_document("Quarterly numbers", &["Revenue grew."]),
    );

    result_handler(&config, &store, sink.clone())
        .handle(&StorageEvent::finalized("summaries-out", "42/0/report-0.json"))
        .await
        .unwrap();

    let rows = sink.rows();
    assert_eq!(rows.len(), 1);

    let (table, row) = &rows[0];
    assert_eq!(table.to_string(), "proj.docs.summaries");
    assert_eq!(row.output_file_uri, "gs://summaries-out/42/0/report-0.json");
    assert_eq!(row.extracted_text, "Quarterly numbers");
    assert_eq!(row.summary, "Revenue grew.");
}

fn batch_operation(state: &str, statuses: Vec<IndividualProcessStatus>) -> Operation {
    Operation {
        name: "projects/proj/locations/us/operations/42".to_string(),
        done: state == "SUCCEEDED" || state == "FAILED",
        metadata: Some(serde_json::json!({
            "@type": "type.googleapis.com/google.cloud.documentai.v1.BatchProcessMetadata",
            "state": state,
            "stateMessage": if state == "FAILED" { "Quota exceeded" } else { "" },
            "individualProcessStatuses": statuses,
        })),
        error: None,
    }
}

fn status(input: &str, output: &str) -> IndividualProcessStatus {
    IndividualProcessStatus {
        input_gcs_source: input.to_string(),
        output_gcs_destination: output.to_string(),
        status: None,
    }
}

#[tokio::test]
async fn test_batch_results_lists_json_shards() {
    let processor = Arc::new(RecordingProcessor::with_operation(batch_operation(
        "SUCCEEDED",
        vec![
            status("gs://uploads/a.pdf", "gs://out/42/0"),
            status("gs://uploads/b.pdf", "not-a-gcs-uri"),
        ],
    )));
    let store = Arc::new(MapObjectStore::new());
    store.put_json("out", "42/0/a-0.json", summarized_document("first", &["one"]));
    store.put_json("out", "42/0/a-1.json", summarized_document("second", &[]));
    store.put("out", "42/0/notes.txt", "text/plain", "ignored");
    store.put_json("out", "43/0/other.json", summarized_document("other", &["x"]));

    let collector = BatchResultCollector::new(processor.clone(), store.clone());
    let report = collector
        .collect("projects/proj/locations/us/operations/42")
        .await
        .unwrap();

    assert_eq!(report.state, BatchState::Succeeded);
    assert_eq!(report.skipped_destinations, vec!["not-a-gcs-uri".to_string()]);
    assert_eq!(report.outputs.len(), 2);

    assert_eq!(report.outputs[0].input_uri, "gs://uploads/a.pdf");
    assert_eq!(report.outputs[0].output_uri, "gs://out/42/0/a-0.json");
    assert_eq!(report.outputs[0].summary.as_deref(), Some("one"));
    assert_eq!(report.outputs[0].text_chars, 5);
    assert_eq!(report.outputs[0].pages, 1);
    assert_eq!(report.outputs[1].summary, None);

    // Only the two JSON shards are downloaded
    assert_eq!(store.downloads.load(Ordering::SeqCst), 2);
    assert_eq!(processor.operation_reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_batch_results_failed_operation_is_error() {
    let processor = Arc::new(RecordingProcessor::with_operation(batch_operation("FAILED", vec![])));
    let store = Arc::new(MapObjectStore::new());

    let err = BatchResultCollector::new(processor, store.clone())
        .collect("projects/proj/locations/us/operations/42")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DocumentAi(ref m) if m.contains("Quota exceeded")));
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_batch_results_operation_error_status() {
    let mut operation = batch_operation("RUNNING", vec![]);
    operation.done = true;
    operation.error = Some(OperationStatus {
        code: 3,
        message: "Invalid input".to_string(),
    });
    let processor = Arc::new(RecordingProcessor::with_operation(operation));

    let err = BatchResultCollector::new(processor, Arc::new(MapObjectStore::new()))
        .collect("projects/proj/locations/us/operations/42")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DocumentAi(ref m) if m.contains("Invalid input")));
}

#[tokio::test]
async fn test_batch_results_running_operation_has_no_outputs() {
    let processor = Arc::new(RecordingProcessor::with_operation(batch_operation(
        "RUNNING",
        vec![status("gs://uploads/a.pdf", "gs://out/42/0")],
    )));
    let store = Arc::new(MapObjectStore::new());
    store.put_json("out", "42/0/a-0.json", summarized_document("first", &["one"]));

    let report = BatchResultCollector::new(processor, store.clone())
        .collect("projects/proj/locations/us/operations/42")
        .await
        .unwrap();

    assert_eq!(report.state, BatchState::Running);
    assert!(report.outputs.is_empty());
    assert_eq!(store.calls(), 0);
}
