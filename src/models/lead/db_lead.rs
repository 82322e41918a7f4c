//! Stored lead row with its store-assigned id.

use super::lead::Lead;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, FromRow)]
pub struct DbLead {
    pub id: Uuid,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub lead: Lead,
}
