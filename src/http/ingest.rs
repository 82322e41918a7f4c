//! Intake endpoints: raw EML, JSON envelope, and dry-run extraction.

use crate::{
  app::AppState,
  models::message::raw_message::RawMessage,
  pipeline::{self, Outcome},
  util::raw_message_from_eml,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::error;

fn outcome_response(result: crate::error::Result<Outcome>) -> axum::response::Response {
  match result {
    Ok(outcome @ Outcome::Saved { .. }) => (StatusCode::CREATED, Json(outcome)).into_response(),
    Ok(outcome) => Json(outcome).into_response(),
    Err(e) => {
      error!("ingest db error: {e}");
      (StatusCode::INTERNAL_SERVER_ERROR, "db error").into_response()
    }
  }
}

pub async fn ingest_json(
  State(state): State<AppState>,
  Json(message): Json<RawMessage>,
) -> impl IntoResponse {
  outcome_response(pipeline::ingest(&state.store, &message).await)
}

pub async fn ingest_raw(State(state): State<AppState>, body: axum::body::Bytes) -> impl IntoResponse {
  let message = match raw_message_from_eml(&body) {
    Ok(m) => m,
    Err(e) => {
      error!("ingest_raw parse error: {e}");
      return (StatusCode::BAD_REQUEST, "invalid EML").into_response();
    }
  };
  outcome_response(pipeline::ingest(&state.store, &message).await)
}

pub async fn extract_preview(Json(message): Json<RawMessage>) -> impl IntoResponse {
  Json(pipeline::preview(&message))
}
