//! Cloud Storage CloudEvents
//!
//! The trigger infrastructure delivers `object.v1.finalized` notifications as
//! CloudEvents over HTTP. Binary content mode carries the attributes in `ce-*`
//! headers and the storage object as the body; structured content mode wraps
//! both in a single `application/cloudevents+json` document.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Event type emitted when a Cloud Storage object is finalized
pub const OBJECT_FINALIZED: &str = "google.cloud.storage.object.v1.finalized";

/// Content type of structured-mode CloudEvents
pub const STRUCTURED_CONTENT_TYPE: &str = "application/cloudevents+json";

/// A storage notification as received by a handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEvent {
    /// CloudEvent id
    #[serde(default)]
    pub id: Option<String>,
    /// CloudEvent type discriminator
    #[serde(rename = "type")]
    pub event_type: String,
    /// CloudEvent source (the bucket resource)
    #[serde(default)]
    pub source: Option<String>,
    /// CloudEvent subject (the object resource)
    #[serde(default)]
    pub subject: Option<String>,
    /// Time the event occurred; an unparseable value is dropped
    #[serde(default, deserialize_with = "lenient_time")]
    pub time: Option<DateTime<Utc>>,
    /// Storage object payload
    pub data: StorageObjectData,
}

/// Storage object fields of the event payload.
///
/// Only `bucket` and `name` are used; the rest is kept for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageObjectData {
    /// Bucket name
    pub bucket: String,
    /// Object key
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Object size; the JSON API encodes it as a string
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub generation: Option<String>,
}

impl StorageEvent {
    /// Build an event from its type and storage location
    pub fn new(event_type: impl Into<String>, bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            event_type: event_type.into(),
            source: None,
            subject: None,
            time: None,
            data: StorageObjectData {
                bucket: bucket.into(),
                name: name.into(),
                content_type: None,
                size: None,
                generation: None,
            },
        }
    }

    /// Build a finalized-object event
    pub fn finalized(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(OBJECT_FINALIZED, bucket, name)
    }

    /// Decode an HTTP-delivered CloudEvent in either content mode
    pub fn from_http(headers: &HeaderMap, body: &[u8]) -> Result<Self> {
        let is_structured = headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with(STRUCTURED_CONTENT_TYPE))
            .unwrap_or(false);

        if is_structured {
            return serde_json::from_slice(body)
                .map_err(|e| Error::InvalidEvent(format!("Malformed structured CloudEvent: {}", e)));
        }

        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let event_type = header("ce-type")
            .ok_or_else(|| Error::InvalidEvent("Missing ce-type header".to_string()))?;

        let data: StorageObjectData = serde_json::from_slice(body)
            .map_err(|e| Error::InvalidEvent(format!("Malformed storage object payload: {}", e)))?;

        let time = header("ce-time").and_then(|raw| parse_time(&raw));

        Ok(Self {
            id: header("ce-id"),
            event_type,
            source: header("ce-source"),
            subject: header("ce-subject"),
            time,
            data,
        })
    }

    /// Whether this is an object-finalized notification
    pub fn is_finalized(&self) -> bool {
        self.event_type == OBJECT_FINALIZED
    }

    /// `gs://` URI of the object the event refers to
    pub fn gcs_uri(&self) -> String {
        format!("gs://{}/{}", self.data.bucket, self.data.name)
    }
}

/// RFC 3339 event time, or `None` when it cannot be parsed
fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| tracing::debug!("Ignoring unparseable event time '{}': {}", raw, e))
        .ok()
}

fn lenient_time<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(parse_time))
}
