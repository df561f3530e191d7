//! Batch operation inspection

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::handlers::BatchReport;
use crate::server::state::AppState;

/// GET /operations/*name - list and summarize the outputs of a batch operation
pub async fn get_operation_results(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<BatchReport>> {
    let name = name.trim_start_matches('/');
    Ok(Json(state.batch_results().collect(name).await?))
}
