//! Utility functions: tracing and RFC 5322 message decoding.

use crate::error::Result;
use crate::models::message::raw_message::RawMessage;
use chrono::{DateTime, Utc};
use mailparse::{parse_mail, DispositionType, MailHeaderMap, ParsedMail};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize pretty CLI logging.
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  fmt()
    .with_env_filter(filter)
    .with_target(false)
    .pretty()
    .init();
}

/// First text and HTML bodies of a MIME tree. Attachments are skipped.
pub fn extract_bodies(parsed: &ParsedMail<'_>) -> (Option<String>, Option<String>) {
  if !parsed.subparts.is_empty() {
    let mut text = None;
    let mut html = None;
    for part in &parsed.subparts {
      let (t, h) = extract_bodies(part);
      text = text.or(t);
      html = html.or(h);
    }
    return (text, html);
  }
  if parsed.get_content_disposition().disposition == DispositionType::Attachment {
    return (None, None);
  }
  let body = parsed.get_body().ok();
  match parsed.ctype.mimetype.as_str() {
    "text/html" => (None, body),
    "text/plain" => (body, None),
    _ => (None, None),
  }
}

/// `Date` header as UTC, if present and parseable.
pub fn message_date(parsed: &ParsedMail<'_>) -> Option<DateTime<Utc>> {
  let raw = parsed.headers.get_first_value("Date")?;
  let secs = mailparse::dateparse(&raw).ok()?;
  DateTime::from_timestamp(secs, 0)
}

/// Decode a raw message into the envelope + body the extractors consume.
pub fn raw_message_from_eml(raw: &[u8]) -> Result<RawMessage> {
  let parsed = parse_mail(raw)?;
  let (text, html) = extract_bodies(&parsed);
  Ok(RawMessage::from_bodies(
    parsed.headers.get_first_value("From").unwrap_or_default(),
    parsed.headers.get_first_value("Subject").unwrap_or_default(),
    message_date(&parsed),
    text,
    html,
  ))
}
