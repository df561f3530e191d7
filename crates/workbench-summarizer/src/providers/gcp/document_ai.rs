//! Google Document AI client for batch processing
//!
//! Batch requests run as long-running operations: the processor reads the
//! input document from Cloud Storage and writes its JSON output under the
//! configured output prefix, which in turn fires the output trigger.

use async_trait::async_trait;
use std::sync::Arc;

use super::auth::GcpAuth;
use crate::error::{Error, Result};
use crate::providers::document_processor::DocumentProcessor;
use crate::types::{BatchProcessRequest, Operation};

/// Google Document AI REST client
pub struct DocumentAiClient {
    auth: Arc<GcpAuth>,
    http: reqwest::Client,
    /// Base URL override (emulators, tests); regional endpoint otherwise
    base_url: Option<String>,
}

impl DocumentAiClient {
    /// Create a new Document AI client
    pub fn new(auth: Arc<GcpAuth>) -> Self {
        Self {
            auth,
            http: reqwest::Client::new(),
            base_url: None,
        }
    }

    /// Send requests to a custom base URL instead of the regional endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Base URL for a resource.
    ///
    /// Document AI is served per region:
    /// `https://LOCATION-documentai.googleapis.com`, where the location is
    /// taken from `projects/PROJECT/locations/LOCATION/...`.
    fn base_url_for(&self, resource_name: &str) -> String {
        if let Some(ref base) = self.base_url {
            return base.clone();
        }

        let location = resource_name.split('/').nth(3).unwrap_or("us");
        format!("https://{}-documentai.googleapis.com", location)
    }

    fn batch_process_url(&self, processor_name: &str) -> String {
        format!(
            "{}/v1/{}:batchProcess",
            self.base_url_for(processor_name),
            processor_name
        )
    }

    fn operation_url(&self, operation_name: &str) -> String {
        format!("{}/v1/{}", self.base_url_for(operation_name), operation_name)
    }

    async fn read_operation(response: reqwest::Response, action: &str) -> Result<Operation> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::document_ai(format!(
                "{} failed ({}): {}",
                action, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::document_ai(format!("Failed to parse {} response: {}", action, e)))
    }
}

#[async_trait]
impl DocumentProcessor for DocumentAiClient {
    async fn batch_process(
        &self,
        processor_name: &str,
        request: &BatchProcessRequest,
    ) -> Result<Operation> {
        let bearer = self.auth.bearer().await?;

        tracing::info!(
            processor = processor_name,
            documents = request.documents().len(),
            "Submitting batch process request to Document AI"
        );

        let response = self
            .http
            .post(self.batch_process_url(processor_name))
            .header(reqwest::header::AUTHORIZATION, bearer)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::document_ai(format!("Batch process request failed: {}", e)))?;

        Self::read_operation(response, "Batch process").await
    }

    async fn get_operation(&self, operation_name: &str) -> Result<Operation> {
        let bearer = self.auth.bearer().await?;

        let response = self
            .http
            .get(self.operation_url(operation_name))
            .header(reqwest::header::AUTHORIZATION, bearer)
            .send()
            .await
            .map_err(|e| Error::document_ai(format!("Get operation request failed: {}", e)))?;

        Self::read_operation(response, "Get operation").await
    }

    fn name(&self) -> &str {
        "document-ai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DocumentAiClient {
        DocumentAiClient::new(Arc::new(GcpAuth::metadata_server()))
    }

    #[test]
    fn test_batch_process_url() {
        let url = client().batch_process_url("projects/my-project/locations/us/processors/abc123");
        assert_eq!(
            url,
            "https://us-documentai.googleapis.com/v1/projects/my-project/locations/us/processors/abc123:batchProcess"
        );
    }

    #[test]
    fn test_versioned_eu_url() {
        let url = client().batch_process_url(
            "projects/p/locations/eu/processors/xyz789/processorVersions/v1",
        );
        assert_eq!(
            url,
            "https://eu-documentai.googleapis.com/v1/projects/p/locations/eu/processors/xyz789/processorVersions/v1:batchProcess"
        );
    }

    #[test]
    fn test_operation_url_with_override() {
        let client = client().with_base_url("http://localhost:8085/");
        assert_eq!(
            client.operation_url("projects/p/locations/us/operations/42"),
            "http://localhost:8085/v1/projects/p/locations/us/operations/42"
        );
    }
}
