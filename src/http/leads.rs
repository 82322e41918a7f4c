//! Lead read-back APIs.

use crate::{app::AppState, db::ListParams};
use axum::{
  extract::{Path as AxumPath, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::error;
use uuid::Uuid;

pub async fn list_leads(
  State(state): State<AppState>,
  Query(params): Query<ListParams>,
) -> impl IntoResponse {
  match state.store.list(&params).await {
    Ok(rows) => Json(rows).into_response(),
    Err(e) => {
      error!("list_leads error: {e}");
      (StatusCode::INTERNAL_SERVER_ERROR, "db error").into_response()
    }
  }
}

pub async fn get_lead(
  State(state): State<AppState>,
  AxumPath(id): AxumPath<Uuid>,
) -> impl IntoResponse {
  match state.store.get(id).await {
    Ok(Some(lead)) => Json(lead).into_response(),
    Ok(None) => (StatusCode::NOT_FOUND, "lead not found").into_response(),
    Err(e) => {
      error!("get_lead error: {e}");
      (StatusCode::INTERNAL_SERVER_ERROR, "db error").into_response()
    }
  }
}
