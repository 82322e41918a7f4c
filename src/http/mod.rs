//! HTTP router and handlers.

use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub mod ingest;
pub mod leads;
pub mod logs;

/// Assemble the HTTP router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ingest", post(ingest::ingest_json))
        .route("/ingest/raw", post(ingest::ingest_raw))
        .route("/extract", post(ingest::extract_preview))
        .route("/leads", get(leads::list_leads))
        .route("/leads/:id", get(leads::get_lead))
        .route("/logs", get(logs::list_logs))
        .with_state(state)
}
