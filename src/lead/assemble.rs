//! Envelope + mapped fields to a complete lead.

use crate::models::lead::lead::{Lead, LeadFields};
use crate::models::message::raw_message::RawMessage;
use chrono::Utc;

/// `email:<sender> - <subject>`
pub fn source_descriptor(message: &RawMessage) -> String {
    format!("email:{} - {}", message.sender, message.subject)
}

/// Build the lead for `message`, or `None` when neither email nor phone was recovered.
pub fn assemble(message: &RawMessage, fields: LeadFields) -> Option<Lead> {
    if !fields.has_contact() {
        return None;
    }
    Some(Lead {
        fields,
        source: source_descriptor(message),
        raw: message.body.clone(),
        received_at: message.received_at.unwrap_or_else(Utc::now),
    })
}
