//! Pattern library: label synonyms and line recognizers.
//!
//! Pure lookup tables, compiled once and shared read-only by every extraction.

use super::{FieldKey, FieldKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// What a human-written label points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTarget {
    Field(FieldKey),
    /// "Registration" and friends: a year or a registration mark depending on the value.
    Registration,
}

use LabelTarget::{Field, Registration};

/// Normalised label -> target. Labels are lowercase with single spaces.
const SYNONYMS: &[(&str, LabelTarget)] = &[
    ("name", Field(FieldKey::Name)),
    ("customer name", Field(FieldKey::Name)),
    ("email", Field(FieldKey::Email)),
    ("email address", Field(FieldKey::Email)),
    ("phone", Field(FieldKey::Phone)),
    ("telephone", Field(FieldKey::Phone)),
    ("contact number", Field(FieldKey::Phone)),
    ("make", Field(FieldKey::Make)),
    ("brand", Field(FieldKey::Make)),
    ("vehicle brand", Field(FieldKey::Make)),
    ("engine brand", Field(FieldKey::Make)),
    ("model", Field(FieldKey::Model)),
    ("vehicle model", Field(FieldKey::Model)),
    ("vehicle series", Field(FieldKey::VehicleSeries)),
    ("vrm", Field(FieldKey::Vrm)),
    ("vehicle vrm", Field(FieldKey::Vrm)),
    ("vehicle registration", Registration),
    ("registration", Registration),
    ("reg", Registration),
    ("year", Field(FieldKey::Year)),
    ("fuel type", Field(FieldKey::FuelType)),
    ("fuel", Field(FieldKey::FuelType)),
    ("postcode", Field(FieldKey::Postcode)),
    ("post code", Field(FieldKey::Postcode)),
    ("zip code", Field(FieldKey::Postcode)),
    ("engine size", Field(FieldKey::EngineSize)),
    ("engine capacity", Field(FieldKey::EngineSize)),
    ("engine title", Field(FieldKey::VehicleTitle)),
    ("vehicle title", Field(FieldKey::VehicleTitle)),
    ("vehicle part", Field(FieldKey::Part)),
    ("part", Field(FieldKey::Part)),
    ("part supplied", Field(FieldKey::PartSupplied)),
    ("supply only", Field(FieldKey::SupplyOnly)),
    ("used condition", Field(FieldKey::UsedCondition)),
    ("new condition", Field(FieldKey::NewCondition)),
    ("reconditioned condition", Field(FieldKey::ReconditionedCondition)),
    ("consider both", Field(FieldKey::ConsiderBoth)),
    ("consider both condition", Field(FieldKey::ConsiderBoth)),
    ("consider both conditions", Field(FieldKey::ConsiderBoth)),
    ("consider all conditions", Field(FieldKey::ConsiderAll)),
    ("vehicle drive", Field(FieldKey::VehicleDrive)),
    ("drive", Field(FieldKey::VehicleDrive)),
    ("collection required", Field(FieldKey::CollectionRequired)),
    ("collection", Field(FieldKey::CollectionRequired)),
    ("engine code", Field(FieldKey::EngineCode)),
    ("additional note", Field(FieldKey::AdditionalNote)),
    ("extra note", Field(FieldKey::AdditionalNote)),
    ("description", Field(FieldKey::AdditionalNote)),
    ("note", Field(FieldKey::AdditionalNote)),
];

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:19|20)\d{2}$").unwrap());

/// Lowercase, drop a trailing colon, collapse runs of whitespace.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .trim_end_matches(':')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn lookup_label(label: &str) -> Option<LabelTarget> {
    let normalized = normalize_label(label);
    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == normalized)
        .map(|(_, target)| *target)
}

/// Resolve a (label, value) pair to the field it fills, if any.
///
/// A checkbox field only accepts a checkbox token; any other value leaves it unset.
pub fn resolve(label: &str, value: &str) -> Option<FieldKey> {
    let key = match lookup_label(label)? {
        Field(key) => key,
        Registration => resolve_registration(value),
    };
    if key.kind() == FieldKind::Flag && parse_flag(value).is_none() {
        return None;
    }
    Some(key)
}

/// A registration-labelled value is a year when it is exactly 1900-2099, otherwise a mark.
pub fn resolve_registration(value: &str) -> FieldKey {
    if is_year(value) {
        FieldKey::Year
    } else {
        FieldKey::Vrm
    }
}

pub fn is_year(value: &str) -> bool {
    YEAR.is_match(value.trim())
}

/// Checkbox tokens: `on|yes|true` and `off|no|false`, any case. Anything else is unknown.
pub fn parse_flag(token: &str) -> Option<bool> {
    match token.trim().to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" => Some(true),
        "off" | "no" | "false" => Some(false),
        _ => None,
    }
}

/// How much text a recognizer claims after its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    /// The capture group only.
    Line,
    /// The rest of the line plus continuation lines (see `text::extend_block`).
    Block,
}

/// One text-mode recognizer: a label alternation plus a value shape.
pub struct Recognizer {
    pub target: LabelTarget,
    pub span: Span,
    pub regex: Regex,
}

const REST_OF_LINE: &str = r"([^\r\n]*)";
const FLAG_TOKEN: &str = r"(on|yes|true|off|no|false)\b";

fn recognizer(target: LabelTarget, labels: &[&str], value: &str, span: Span) -> Recognizer {
    let alternation = labels
        .iter()
        .map(|l| regex::escape(l).replace(' ', r"[ \t]*"))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?im)^[ \t]*(?:{alternation})[ \t]*:[ \t]*{value}");
    Recognizer {
        target,
        span,
        regex: Regex::new(&pattern).unwrap(),
    }
}

fn line(key: FieldKey, labels: &[&str]) -> Recognizer {
    recognizer(Field(key), labels, REST_OF_LINE, Span::Line)
}

fn flag(key: FieldKey, labels: &[&str]) -> Recognizer {
    recognizer(Field(key), labels, FLAG_TOKEN, Span::Line)
}

/// Line recognizers in priority order. Earlier entries claim a key first.
pub static TEXT_RECOGNIZERS: Lazy<Vec<Recognizer>> = Lazy::new(|| {
    vec![
        line(FieldKey::Name, &["Name", "Customer Name"]),
        recognizer(
            Field(FieldKey::Email),
            &["Email", "Email Address"],
            r"([\w.%+-]+@[\w.-]+\.[A-Za-z]{2,})",
            Span::Line,
        ),
        recognizer(
            Field(FieldKey::Phone),
            &["Phone", "Telephone", "Contact Number"],
            r"([\d+() \t.-]+)",
            Span::Line,
        ),
        line(FieldKey::Make, &["Make", "Brand", "Vehicle Brand", "Engine Brand"]),
        line(FieldKey::Model, &["Model", "Vehicle Model"]),
        line(FieldKey::VehicleSeries, &["Vehicle Series"]),
        line(FieldKey::Vrm, &["VRM", "Vehicle VRM"]),
        recognizer(
            Field(FieldKey::Year),
            &["Year"],
            r"((?:19|20)\d{2})\b",
            Span::Line,
        ),
        recognizer(
            Registration,
            &["Vehicle Registration", "Registration", "Reg"],
            REST_OF_LINE,
            Span::Line,
        ),
        line(FieldKey::FuelType, &["Fuel Type", "Fuel"]),
        recognizer(
            Field(FieldKey::Postcode),
            &["Postcode", "Post Code", "Zip Code"],
            r"([A-Za-z0-9 \t-]+)",
            Span::Line,
        ),
        recognizer(
            Field(FieldKey::EngineSize),
            &["Engine Size", "Engine Capacity"],
            r"([\d.]+(?:[ \t]*L\b)?)",
            Span::Line,
        ),
        line(FieldKey::VehicleTitle, &["Engine Title", "Vehicle Title"]),
        line(FieldKey::Part, &["Vehicle Part", "Part"]),
        flag(FieldKey::PartSupplied, &["Part Supplied"]),
        flag(FieldKey::SupplyOnly, &["Supply Only"]),
        flag(FieldKey::UsedCondition, &["Used Condition"]),
        flag(FieldKey::NewCondition, &["New Condition"]),
        flag(FieldKey::ReconditionedCondition, &["Reconditioned Condition"]),
        flag(
            FieldKey::ConsiderBoth,
            &["Consider Both Conditions", "Consider Both Condition", "Consider Both"],
        ),
        flag(FieldKey::ConsiderAll, &["Consider All Conditions"]),
        line(FieldKey::VehicleDrive, &["Vehicle Drive", "Drive"]),
        flag(FieldKey::CollectionRequired, &["Collection Required", "Collection"]),
        line(FieldKey::EngineCode, &["Engine Code"]),
        recognizer(
            Field(FieldKey::AdditionalNote),
            &["Additional Note", "Extra Note", "Description", "Note"],
            REST_OF_LINE,
            Span::Block,
        ),
    ]
});
