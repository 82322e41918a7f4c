//! Ingest audit log API.

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::error;

pub async fn list_logs(State(state): State<AppState>) -> impl IntoResponse {
  match state.store.recent_logs(200).await {
    Ok(logs) => Json(logs).into_response(),
    Err(e) => {
      error!("list_logs error: {e}");
      (StatusCode::INTERNAL_SERVER_ERROR, "db error").into_response()
    }
  }
}
