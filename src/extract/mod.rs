//! Field extraction: recover labelled values from form notification bodies.
//!
//! Two extractors share one [`FieldBag`] type:
//! - [`text`]: line-oriented recognizers with a generic `Label: value` fallback
//! - [`markup`]: ordered structural heuristics over a parsed HTML tree
//!
//! Both resolve labels through [`patterns`], so a label means the same thing
//! regardless of which body a message carried.

use crate::models::message::raw_message::{ContentType, RawMessage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod markup;
pub mod patterns;
pub mod text;

/// Canonical field keys. The order here is the order used for display and storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Name,
    Email,
    Phone,
    Make,
    Model,
    Vrm,
    Year,
    FuelType,
    Postcode,
    EngineSize,
    VehicleTitle,
    VehicleSeries,
    Part,
    PartSupplied,
    SupplyOnly,
    UsedCondition,
    NewCondition,
    ReconditionedCondition,
    ConsiderBoth,
    ConsiderAll,
    VehicleDrive,
    CollectionRequired,
    EngineCode,
    AdditionalNote,
}

/// How a captured value is interpreted downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, stored as captured.
    Text,
    /// Checkbox-style value; only `on|yes|true` and `off|no|false` mean anything.
    Flag,
}

impl FieldKey {
    pub const ALL: [FieldKey; 24] = [
        FieldKey::Name,
        FieldKey::Email,
        FieldKey::Phone,
        FieldKey::Make,
        FieldKey::Model,
        FieldKey::Vrm,
        FieldKey::Year,
        FieldKey::FuelType,
        FieldKey::Postcode,
        FieldKey::EngineSize,
        FieldKey::VehicleTitle,
        FieldKey::VehicleSeries,
        FieldKey::Part,
        FieldKey::PartSupplied,
        FieldKey::SupplyOnly,
        FieldKey::UsedCondition,
        FieldKey::NewCondition,
        FieldKey::ReconditionedCondition,
        FieldKey::ConsiderBoth,
        FieldKey::ConsiderAll,
        FieldKey::VehicleDrive,
        FieldKey::CollectionRequired,
        FieldKey::EngineCode,
        FieldKey::AdditionalNote,
    ];

    /// Canonical key as it appears in serialized field bags.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Email => "email",
            FieldKey::Phone => "phone",
            FieldKey::Make => "make",
            FieldKey::Model => "model",
            FieldKey::Vrm => "vrm",
            FieldKey::Year => "year",
            FieldKey::FuelType => "fuelType",
            FieldKey::Postcode => "postcode",
            FieldKey::EngineSize => "engineSize",
            FieldKey::VehicleTitle => "vehicleTitle",
            FieldKey::VehicleSeries => "vehicleSeries",
            FieldKey::Part => "part",
            FieldKey::PartSupplied => "partSupplied",
            FieldKey::SupplyOnly => "supplyOnly",
            FieldKey::UsedCondition => "usedCondition",
            FieldKey::NewCondition => "newCondition",
            FieldKey::ReconditionedCondition => "reconditionedCondition",
            FieldKey::ConsiderBoth => "considerBoth",
            FieldKey::ConsiderAll => "considerAll",
            FieldKey::VehicleDrive => "vehicleDrive",
            FieldKey::CollectionRequired => "collectionRequired",
            FieldKey::EngineCode => "engineCode",
            FieldKey::AdditionalNote => "additionalNote",
        }
    }

    /// Column name in the `leads` table.
    pub fn column(self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Email => "email",
            FieldKey::Phone => "number",
            FieldKey::Make => "vehicle_brand",
            FieldKey::Model => "vehicle_model",
            FieldKey::Vrm => "vehicle_vrm",
            FieldKey::Year => "vehicle_reg",
            FieldKey::FuelType => "fuel_type",
            FieldKey::Postcode => "postcode",
            FieldKey::EngineSize => "engine_capacity",
            FieldKey::VehicleTitle => "vehicle_title",
            FieldKey::VehicleSeries => "vehicle_series",
            FieldKey::Part => "vehicle_part",
            FieldKey::PartSupplied => "part_supplied",
            FieldKey::SupplyOnly => "supply_only",
            FieldKey::UsedCondition => "used_condition",
            FieldKey::NewCondition => "new_condition",
            FieldKey::ReconditionedCondition => "reconditioned_condition",
            FieldKey::ConsiderBoth => "consider_both",
            FieldKey::ConsiderAll => "consider_all_condition",
            FieldKey::VehicleDrive => "vehicle_drive",
            FieldKey::CollectionRequired => "collection_required",
            FieldKey::EngineCode => "engine_code",
            FieldKey::AdditionalNote => "description",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldKey::PartSupplied
            | FieldKey::SupplyOnly
            | FieldKey::UsedCondition
            | FieldKey::NewCondition
            | FieldKey::ReconditionedCondition
            | FieldKey::ConsiderBoth
            | FieldKey::ConsiderAll
            | FieldKey::CollectionRequired => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }
}

/// Extracted values keyed by canonical field. A key, once set, is never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldBag(BTreeMap<FieldKey, String>);

impl FieldBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.0.contains_key(&key)
    }

    /// Store `value` (trimmed) under `key` unless the key is already set or
    /// the value is blank. Returns whether the bag changed.
    pub fn insert_if_absent(&mut self, key: FieldKey, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value.to_string());
        true
    }

    /// Fill every key still unset here from `other`.
    pub fn merge_missing(&mut self, other: FieldBag) {
        for (key, value) in other.0 {
            self.insert_if_absent(key, &value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Run the extractor matching the message's content type.
pub fn extract(message: &RawMessage) -> FieldBag {
    match message.content_type {
        ContentType::Html => markup::extract_from_html(&message.body),
        ContentType::Text => text::extract_from_text(&message.body),
    }
}
