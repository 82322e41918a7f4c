//! Canonical lead record, as assembled and as stored.

use crate::extract::FieldKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Extracted fields under their storage column names.
///
/// Checkbox fields are tri-state: `Some(true)`, `Some(false)` or unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct LeadFields {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub number: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vehicle_brand: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vehicle_model: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vehicle_vrm: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vehicle_reg: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fuel_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub postcode: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub engine_capacity: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vehicle_title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vehicle_series: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vehicle_part: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub part_supplied: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub supply_only: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub used_condition: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub new_condition: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reconditioned_condition: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub consider_both: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub consider_all_condition: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vehicle_drive: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub collection_required: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub engine_code: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// A column value ready to bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
  Text(Option<String>),
  Flag(Option<bool>),
}

impl LeadFields {
  /// Value stored under `key`'s column.
  pub fn column_value(&self, key: FieldKey) -> ColumnValue {
    use ColumnValue::{Flag, Text};
    match key {
      FieldKey::Name => Text(self.name.clone()),
      FieldKey::Email => Text(self.email.clone()),
      FieldKey::Phone => Text(self.number.clone()),
      FieldKey::Make => Text(self.vehicle_brand.clone()),
      FieldKey::Model => Text(self.vehicle_model.clone()),
      FieldKey::Vrm => Text(self.vehicle_vrm.clone()),
      FieldKey::Year => Text(self.vehicle_reg.clone()),
      FieldKey::FuelType => Text(self.fuel_type.clone()),
      FieldKey::Postcode => Text(self.postcode.clone()),
      FieldKey::EngineSize => Text(self.engine_capacity.clone()),
      FieldKey::VehicleTitle => Text(self.vehicle_title.clone()),
      FieldKey::VehicleSeries => Text(self.vehicle_series.clone()),
      FieldKey::Part => Text(self.vehicle_part.clone()),
      FieldKey::PartSupplied => Flag(self.part_supplied),
      FieldKey::SupplyOnly => Flag(self.supply_only),
      FieldKey::UsedCondition => Flag(self.used_condition),
      FieldKey::NewCondition => Flag(self.new_condition),
      FieldKey::ReconditionedCondition => Flag(self.reconditioned_condition),
      FieldKey::ConsiderBoth => Flag(self.consider_both),
      FieldKey::ConsiderAll => Flag(self.consider_all_condition),
      FieldKey::VehicleDrive => Text(self.vehicle_drive.clone()),
      FieldKey::CollectionRequired => Flag(self.collection_required),
      FieldKey::EngineCode => Text(self.engine_code.clone()),
      FieldKey::AdditionalNote => Text(self.description.clone()),
    }
  }

  /// Whether the record carries a way to contact the sender.
  pub fn has_contact(&self) -> bool {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    present(&self.email) || present(&self.number)
  }
}

/// An accepted lead, complete and ready for the store. Never mutated after assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Lead {
  #[serde(flatten)]
  #[sqlx(flatten)]
  pub fields: LeadFields,
  pub source: String,
  pub raw: String,
  pub received_at: DateTime<Utc>,
}
