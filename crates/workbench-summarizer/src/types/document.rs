//! Document AI output document
//!
//! Only the fields the pipeline reads are modelled. Anything else in the
//! processor output is ignored, so newer output formats keep parsing. Keys are
//! accepted in both the camelCase form the processor writes and snake_case.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Structured result of document processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default, alias = "mime_type")]
    pub mime_type: Option<String>,
    /// Full extracted text
    #[serde(default)]
    pub text: Option<String>,
    /// Extracted entities, in processor order
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// A named, typed extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(default, rename = "type", alias = "type_")]
    pub entity_type: Option<String>,
    #[serde(default, alias = "mention_text")]
    pub mention_text: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default, alias = "normalized_value")]
    pub normalized_value: Option<NormalizedValue>,
}

/// Normalized form of an entity value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedValue {
    #[serde(default)]
    pub text: Option<String>,
}

/// Page metadata (only the page number is requested by the default field mask)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default, alias = "page_number")]
    pub page_number: Option<u32>,
}

impl ProcessedDocument {
    /// Parse processor output, tolerating unknown fields
    pub fn from_json(bytes: &[u8], uri: &str) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::document_parse(uri, e.to_string()))
    }

    /// Full text, empty when the processor returned none
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Summary: normalized value of the first entity.
    ///
    /// Fails with [`Error::NoEntities`] when there is no entity. A first entity
    /// without a normalized value yields an empty summary.
    pub fn summary(&self, uri: &str) -> Result<&str> {
        let first = self.entities.first().ok_or_else(|| Error::NoEntities {
            uri: uri.to_string(),
        })?;

        match first.normalized_value.as_ref().and_then(|v| v.text.as_deref()) {
            Some(text) => Ok(text),
            None => {
                tracing::warn!(
                    uri,
                    entity_type = first.entity_type.as_deref().unwrap_or(""),
                    "First entity has no normalized value; using an empty summary"
                );
                Ok("")
            }
        }
    }
}
