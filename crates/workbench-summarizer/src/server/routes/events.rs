//! CloudEvent endpoints

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};

use crate::error::Result;
use crate::handlers::{HandlerOutcome, StoredSummary, Submission};
use crate::server::state::AppState;
use crate::types::StorageEvent;

/// POST /on_upload - submit an uploaded document for processing
pub async fn on_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<HandlerOutcome<Submission>>> {
    let event = StorageEvent::from_http(&headers, &body)?;
    Ok(Json(state.ingest().handle(&event).await?))
}

/// POST /on_output - store the summary of a processor output file
pub async fn on_output(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<HandlerOutcome<StoredSummary>>> {
    let event = StorageEvent::from_http(&headers, &body)?;
    Ok(Json(state.result().handle(&event).await?))
}
