//! Inbound message as handed over by a transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which body a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
  Html,
  Text,
}

/// Envelope plus body of one inbound message. Never mutated after receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
  #[serde(default)]
  pub sender: String,
  #[serde(default)]
  pub subject: String,
  #[serde(default)]
  pub received_at: Option<DateTime<Utc>>,
  pub content_type: ContentType,
  pub body: String,
}

impl RawMessage {
  /// Build from whichever bodies a MIME tree produced; HTML wins when both exist.
  pub fn from_bodies(
    sender: impl Into<String>,
    subject: impl Into<String>,
    received_at: Option<DateTime<Utc>>,
    text: Option<String>,
    html: Option<String>,
  ) -> Self {
    let (content_type, body) = match (html, text) {
      (Some(h), _) if !h.trim().is_empty() => (ContentType::Html, h),
      (_, Some(t)) => (ContentType::Text, t),
      (Some(h), None) => (ContentType::Html, h),
      (None, None) => (ContentType::Text, String::new()),
    };
    RawMessage {
      sender: sender.into(),
      subject: subject.into(),
      received_at,
      content_type,
      body,
    }
  }
}
