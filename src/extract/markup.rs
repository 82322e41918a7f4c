//! HTML extraction using the `scraper` crate.
//!
//! Form notifications arrive in several structural dialects. Each dialect is
//! handled by one [`Heuristic`]; heuristics run in a fixed order and a field
//! filled by an earlier one is never overwritten by a later one.

use super::{patterns, FieldBag};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// One structural strategy for finding label/value pairs.
pub trait Heuristic: Sync {
    fn name(&self) -> &'static str;

    /// Raw (label, value) pairs in document order. Labels have their colon removed.
    fn pairs(&self, doc: &Html) -> Vec<(String, String)>;

    /// Resolve pairs into fields, first pair per field wins.
    fn scan(&self, doc: &Html) -> FieldBag {
        let mut bag = FieldBag::new();
        for (label, value) in self.pairs(doc) {
            if let Some(key) = patterns::resolve(&label, &value) {
                bag.insert_if_absent(key, &value);
            }
        }
        bag
    }
}

/// `<span class="label">Email:</span><span>value</span>`
pub struct LabeledElement;

/// `<span>Email:</span><span>value</span>`
pub struct ColonSpan;

/// `<p><strong>Email:</strong> value</p>`
pub struct BoldPrefix;

/// `<td><i>Email:</i> value</td>`: any leaf label followed by a bare text node.
pub struct TrailingText;

/// Heuristics in priority order.
pub static HEURISTICS: &[&dyn Heuristic] = &[&LabeledElement, &ColonSpan, &BoldPrefix, &TrailingText];

pub fn extract_from_html(html: &str) -> FieldBag {
    let doc = Html::parse_document(html);
    let mut bag = FieldBag::new();
    for heuristic in HEURISTICS {
        let found = heuristic.scan(&doc);
        debug!(heuristic = heuristic.name(), fields = found.len(), "markup scan");
        bag.merge_missing(found);
    }
    bag
}

/// Every pair each heuristic sees, before resolution. Used by the `debug` command.
pub fn debug_pairs(html: &str) -> Vec<(&'static str, String, String)> {
    let doc = Html::parse_document(html);
    HEURISTICS
        .iter()
        .flat_map(|h| {
            h.pairs(&doc)
                .into_iter()
                .map(move |(label, value)| (h.name(), label, value))
        })
        .collect()
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Label text with its trailing colon removed, if it has one.
fn colon_label(text: &str) -> Option<String> {
    let text = text.trim();
    let label = text.strip_suffix(':')?.trim();
    (!label.is_empty()).then(|| label.to_string())
}

fn is_label_marked(el: ElementRef<'_>) -> bool {
    el.value().classes().any(|c| c.eq_ignore_ascii_case("label"))
}

fn next_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// A sibling's text, when it looks like a value rather than another label.
fn sibling_value(next: ElementRef<'_>) -> Option<String> {
    let text = text_of(next);
    if text.is_empty() || text.ends_with(':') || is_label_marked(next) {
        return None;
    }
    Some(text)
}

impl Heuristic for LabeledElement {
    fn name(&self) -> &'static str {
        "labeled-element"
    }

    fn pairs(&self, doc: &Html) -> Vec<(String, String)> {
        let sel = Selector::parse(".label").expect("static selector must parse");
        doc.select(&sel)
            .filter_map(|el| {
                let label = text_of(el).replace(':', "").trim().to_string();
                if label.is_empty() {
                    return None;
                }
                let value = next_element(el).and_then(sibling_value)?;
                Some((label, value))
            })
            .collect()
    }
}

impl Heuristic for ColonSpan {
    fn name(&self) -> &'static str {
        "colon-span"
    }

    fn pairs(&self, doc: &Html) -> Vec<(String, String)> {
        let sel = Selector::parse("span").expect("static selector must parse");
        doc.select(&sel)
            .filter_map(|el| {
                let label = colon_label(&text_of(el))?;
                let next = next_element(el).filter(|n| n.value().name() == "span")?;
                Some((label, sibling_value(next)?))
            })
            .collect()
    }
}

impl Heuristic for BoldPrefix {
    fn name(&self) -> &'static str {
        "bold-prefix"
    }

    fn pairs(&self, doc: &Html) -> Vec<(String, String)> {
        let sel = Selector::parse("strong, b").expect("static selector must parse");
        doc.select(&sel)
            .filter_map(|el| {
                let label = colon_label(&text_of(el))?;
                let parent = el.parent().and_then(ElementRef::wrap)?;
                let mut own = String::new();
                for child in parent.children() {
                    if let Some(t) = child.value().as_text() {
                        own.push_str(t);
                    }
                }
                let value = own.trim();
                (!value.is_empty()).then(|| (label, value.to_string()))
            })
            .collect()
    }
}

impl Heuristic for TrailingText {
    fn name(&self) -> &'static str {
        "trailing-text"
    }

    fn pairs(&self, doc: &Html) -> Vec<(String, String)> {
        let sel = Selector::parse("body *").expect("static selector must parse");
        doc.select(&sel)
            .filter(|el| !el.children().any(|c| c.value().is_element()))
            .filter_map(|el| {
                let label = colon_label(&text_of(el))?;
                let next = el.next_sibling()?;
                let value = next.value().as_text()?.trim();
                if value.is_empty() || value.ends_with(':') {
                    return None;
                }
                Some((label, value.to_string()))
            })
            .collect()
    }
}
