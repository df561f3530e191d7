//! Routes for the summarizer server

pub mod events;
pub mod operations;

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::FunctionTarget;
use crate::server::state::AppState;

/// Build event and inspection routes.
///
/// When a function target is configured its handler is also served at `/`,
/// which is where the trigger infrastructure delivers events.
pub fn event_routes(function_target: Option<FunctionTarget>) -> Router<AppState> {
    let router = Router::new()
        .route("/on_upload", post(events::on_upload))
        .route("/on_output", post(events::on_output))
        .route("/operations/*name", get(operations::get_operation_results));

    match function_target {
        Some(FunctionTarget::OnUpload) => router.route("/", post(events::on_upload)),
        Some(FunctionTarget::OnOutput) => router.route("/", post(events::on_output)),
        None => router,
    }
}
