//! Object store provider trait for reading processor output

use async_trait::async_trait;

use crate::error::Result;

/// Listing entry for a stored object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    /// Bucket name
    pub bucket: String,
    /// Object key
    pub name: String,
    /// Content type as recorded by the store
    pub content_type: Option<String>,
}

impl ObjectInfo {
    /// `gs://` URI of the object
    pub fn uri(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.name)
    }
}

/// Trait for object storage
///
/// Implementations:
/// - `GcsObjectStore`: Google Cloud Storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download an object's raw bytes
    async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>>;

    /// List every object under a prefix
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
