//! One message in, zero or one stored lead out.
//!
//! Each message is handled in isolation: a rejection or a storage failure is
//! reported for that message and never stops the rest of a batch.

use crate::db::{LeadStore, SaveOutcome};
use crate::error::Result;
use crate::extract::{self, FieldBag};
use crate::lead::{self, source_descriptor};
use crate::models::lead::lead::Lead;
use crate::models::message::raw_message::RawMessage;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

/// What happened to one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Saved { id: Uuid },
    Duplicate,
    /// No email or phone could be recovered.
    Skipped,
}

/// Extraction result without touching the store.
#[derive(Debug, Serialize)]
pub struct Preview {
    pub fields: FieldBag,
    pub lead: Option<Lead>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub saved: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Extract, map and assemble. Pure apart from the "now" fallback timestamp.
pub fn preview(message: &RawMessage) -> Preview {
    let fields = extract::extract(message);
    let lead = lead::assemble(message, lead::map_fields(&fields));
    Preview { fields, lead }
}

/// Record an outcome in the audit table. A failed write never changes the outcome.
async fn audit(store: &LeadStore, level: &str, outcome: &str, source: &str, detail: Option<&str>) {
    if let Err(e) = store.log(level, outcome, source, detail).await {
        warn!(outcome, "audit log write failed: {e}");
    }
}

/// Run one message through extraction and hand the result to the store.
pub async fn ingest(store: &LeadStore, message: &RawMessage) -> Result<Outcome> {
    let source = source_descriptor(message);
    let Some(lead) = preview(message).lead else {
        warn!(sender = %message.sender, subject = %message.subject, "skipped: no email/phone found");
        audit(store, "WARN", "skipped", &source, Some("no email/phone found")).await;
        return Ok(Outcome::Skipped);
    };

    let outcome = match store.save(&lead).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(sender = %message.sender, subject = %message.subject, "failed saving lead: {e}");
            audit(store, "ERROR", "failed", &source, Some(&e.to_string())).await;
            return Err(e);
        }
    };

    match outcome {
        SaveOutcome::Inserted(id) => {
            info!(%id, email = ?lead.fields.email, number = ?lead.fields.number, "saved lead from {source}");
            audit(store, "INFO", "saved", &source, Some(&id.to_string())).await;
            Ok(Outcome::Saved { id })
        }
        SaveOutcome::Duplicate => {
            info!("duplicate lead ignored from {source}");
            audit(store, "INFO", "duplicate", &source, None).await;
            Ok(Outcome::Duplicate)
        }
    }
}

/// Ingest every message, counting outcomes. Failures are logged and counted, never propagated.
pub async fn ingest_batch<I>(store: &LeadStore, messages: I) -> BatchReport
where
    I: IntoIterator<Item = RawMessage>,
{
    let mut report = BatchReport::default();
    for message in messages {
        match ingest(store, &message).await {
            Ok(Outcome::Saved { .. }) => report.saved += 1,
            Ok(Outcome::Duplicate) => report.duplicates += 1,
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(_) => report.failed += 1,
        }
    }
    info!(
        saved = report.saved,
        duplicates = report.duplicates,
        skipped = report.skipped,
        failed = report.failed,
        "batch complete"
    );
    report
}
