//! Plain-text extraction.
//!
//! Every recognizer runs against the whole document. Only when none of them
//! produce a value does the generic `label: value` line scan run.

use super::patterns::{self, LabelTarget, Span, TEXT_RECOGNIZERS};
use super::FieldBag;
use tracing::debug;

pub fn extract_from_text(text: &str) -> FieldBag {
    let mut bag = FieldBag::new();

    for rec in TEXT_RECOGNIZERS.iter() {
        let Some(caps) = rec.regex.captures(text) else {
            continue;
        };
        let Some(m) = caps.get(1) else {
            continue;
        };
        let value = match rec.span {
            Span::Line => m.as_str().trim().to_string(),
            Span::Block => extend_block(text, m.as_str(), m.end()),
        };
        let key = match rec.target {
            LabelTarget::Field(key) => key,
            LabelTarget::Registration => patterns::resolve_registration(&value),
        };
        bag.insert_if_absent(key, &value);
    }

    if bag.is_empty() {
        debug!("no recognizer matched, scanning generic label lines");
        scan_label_lines(text, &mut bag);
    }
    bag
}

/// Generic `label: value` scan, one pair per line.
pub fn scan_label_lines(text: &str, bag: &mut FieldBag) {
    for line in text.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        if let Some(key) = patterns::resolve(label, value) {
            bag.insert_if_absent(key, value);
        }
    }
}

/// Grow a block value over following lines until a blank line, another
/// recognised `Label:` line, or the end of the document.
fn extend_block(text: &str, first: &str, end: usize) -> String {
    let mut lines = vec![first.trim().to_string()];
    for line in text[end..].lines().skip(1) {
        let trimmed = line.trim();
        if trimmed.is_empty() || starts_with_known_label(trimmed) {
            break;
        }
        lines.push(trimmed.to_string());
    }
    lines.join("\n").trim().to_string()
}

fn starts_with_known_label(line: &str) -> bool {
    line.split_once(':')
        .is_some_and(|(label, _)| patterns::lookup_label(label).is_some())
}
