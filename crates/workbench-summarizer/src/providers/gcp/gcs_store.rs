//! Google Cloud Storage object store

use async_trait::async_trait;

use google_cloud_storage::client::Client as GcsClient;
use google_cloud_storage::http::objects::download::Range;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::list::ListObjectsRequest;

use crate::error::{Error, Result};
use crate::providers::object_store::{ObjectInfo, ObjectStore};

/// Google Cloud Storage object store
pub struct GcsObjectStore {
    client: GcsClient,
}

impl GcsObjectStore {
    /// Create a store authenticated with application default credentials
    pub async fn new() -> Result<Self> {
        let config = google_cloud_storage::client::ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| Error::Config(format!("Failed to create GCS client: {}", e)))?;

        Ok(Self {
            client: GcsClient::new(config),
        })
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>> {
        tracing::info!(bucket, object, "Fetching object from GCS");

        self.client
            .download_object(
                &GetObjectRequest {
                    bucket: bucket.to_string(),
                    object: object.to_string(),
                    ..Default::default()
                },
                &Range::default(),
            )
            .await
            .map_err(|e| {
                Error::storage(format!("Failed to download gs://{}/{}: {}", bucket, object, e))
            })
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let list_request = ListObjectsRequest {
                bucket: bucket.to_string(),
                prefix: Some(prefix.to_string()),
                page_token: page_token.take(),
                ..Default::default()
            };

            let response = self
                .client
                .list_objects(&list_request)
                .await
                .map_err(|e| {
                    Error::storage(format!("Failed to list gs://{}/{}: {}", bucket, prefix, e))
                })?;

            objects.extend(response.items.unwrap_or_default().into_iter().map(|item| ObjectInfo {
                bucket: bucket.to_string(),
                name: item.name,
                content_type: item.content_type,
            }));

            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(objects)
    }

    fn name(&self) -> &str {
        "gcs"
    }
}
