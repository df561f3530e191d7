//! Application state for the summarizer server

use std::sync::Arc;

use crate::config::{AppConfig, BackendProvider};
use crate::error::Result;
use crate::handlers::{BatchResultCollector, IngestHandler, Persistence, ResultHandler};
use crate::providers::{
    gcp::{BigQueryClient, DocumentAiClient, GcpAuth, GcsObjectStore},
    local::{DryRunProcessor, LocalObjectStore, MemoryTableSink},
    DocumentProcessor, ObjectStore, TableSink,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    ingest: IngestHandler,
    result: ResultHandler,
    batch_results: BatchResultCollector,
}

impl AppState {
    /// Create state with the providers selected by `config.backend`
    pub async fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing application state (backend: {:?})...", config.backend);

        let (processor, store, sink): (
            Arc<dyn DocumentProcessor>,
            Arc<dyn ObjectStore>,
            Arc<dyn TableSink>,
        ) = match config.backend {
            BackendProvider::Gcp => {
                let auth = Arc::new(GcpAuth::from_config(&config.gcp)?);

                let mut document_ai = DocumentAiClient::new(Arc::clone(&auth));
                if let Some(ref endpoint) = config.gcp.document_ai_endpoint {
                    document_ai = document_ai.with_base_url(endpoint.clone());
                }

                let mut bigquery = BigQueryClient::new(Arc::clone(&auth));
                if let Some(ref endpoint) = config.gcp.bigquery_endpoint {
                    bigquery = bigquery.with_base_url(endpoint.clone());
                }

                let store = GcsObjectStore::new().await?;
                tracing::info!("Using GCP backend (Document AI + GCS + BigQuery)");

                (Arc::new(document_ai), Arc::new(store), Arc::new(bigquery))
            }
            BackendProvider::Local => {
                tracing::info!(
                    "Using local backend (dry-run processor, objects under {})",
                    config.local_storage_dir.display()
                );
                (
                    Arc::new(DryRunProcessor::new()),
                    Arc::new(LocalObjectStore::new(config.local_storage_dir.clone())),
                    Arc::new(MemoryTableSink::new()),
                )
            }
        };

        Ok(Self::from_providers(config, processor, store, sink))
    }

    /// Create state from explicit providers
    pub fn from_providers(
        config: AppConfig,
        processor: Arc<dyn DocumentProcessor>,
        store: Arc<dyn ObjectStore>,
        sink: Arc<dyn TableSink>,
    ) -> Self {
        let summarizer = Arc::new(config.summarizer.clone());

        let ingest = IngestHandler::new(Arc::clone(&summarizer), Arc::clone(&processor));
        let result = ResultHandler::new(summarizer, Arc::clone(&store), Persistence::new(sink));
        let batch_results = BatchResultCollector::new(processor, store);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                ingest,
                result,
                batch_results,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn ingest(&self) -> &IngestHandler {
        &self.inner.ingest
    }

    pub fn result(&self) -> &ResultHandler {
        &self.inner.result
    }

    pub fn batch_results(&self) -> &BatchResultCollector {
        &self.inner.batch_results
    }
}
