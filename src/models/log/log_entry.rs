//! Audit entry recorded for every ingest attempt.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow)]
pub struct LogEntry {
    pub id: i64,
    pub ts: DateTime<Utc>,
    pub level: String,
    /// `saved`, `duplicate`, `skipped` or `failed`.
    pub outcome: String,
    /// Source descriptor of the message (`email:<sender> - <subject>`).
    pub source: String,
    pub detail: Option<String>,
}
