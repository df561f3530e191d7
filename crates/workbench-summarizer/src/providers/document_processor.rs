//! Document processor provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{BatchProcessRequest, Operation};

/// Trait for the external document-understanding service
///
/// Implementations:
/// - `DocumentAiClient`: Google Document AI REST API
#[async_trait]
pub trait DocumentProcessor: Send + Sync {
    /// Start a batch process operation against `processor_name`.
    ///
    /// Returns as soon as the operation is accepted; completion is never awaited.
    async fn batch_process(
        &self,
        processor_name: &str,
        request: &BatchProcessRequest,
    ) -> Result<Operation>;

    /// Fetch the current state of an operation (single read, no polling)
    async fn get_operation(&self, operation_name: &str) -> Result<Operation>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
