//! Field bag to storage columns. No I/O, cannot fail.

use crate::extract::patterns::parse_flag;
use crate::extract::{FieldBag, FieldKey};
use crate::models::lead::lead::LeadFields;

pub fn map_fields(bag: &FieldBag) -> LeadFields {
    let text = |key: FieldKey| bag.get(key).map(str::to_string);
    let flag = |key: FieldKey| bag.get(key).and_then(parse_flag);

    // An explicit "consider both" answer, even an unreadable one, shadows "consider all".
    let consider_both = match bag.get(FieldKey::ConsiderBoth) {
        Some(token) => parse_flag(token),
        None => flag(FieldKey::ConsiderAll),
    };

    LeadFields {
        name: text(FieldKey::Name),
        email: text(FieldKey::Email),
        number: text(FieldKey::Phone),
        vehicle_brand: text(FieldKey::Make),
        vehicle_model: text(FieldKey::Model).or_else(|| text(FieldKey::VehicleSeries)),
        vehicle_vrm: text(FieldKey::Vrm),
        vehicle_reg: text(FieldKey::Year),
        fuel_type: text(FieldKey::FuelType),
        postcode: text(FieldKey::Postcode),
        engine_capacity: text(FieldKey::EngineSize),
        vehicle_title: text(FieldKey::VehicleTitle),
        vehicle_series: text(FieldKey::VehicleSeries),
        vehicle_part: text(FieldKey::Part),
        part_supplied: flag(FieldKey::PartSupplied),
        supply_only: flag(FieldKey::SupplyOnly),
        used_condition: flag(FieldKey::UsedCondition),
        new_condition: flag(FieldKey::NewCondition),
        reconditioned_condition: flag(FieldKey::ReconditionedCondition),
        consider_both,
        consider_all_condition: flag(FieldKey::ConsiderAll),
        vehicle_drive: text(FieldKey::VehicleDrive),
        collection_required: flag(FieldKey::CollectionRequired),
        engine_code: text(FieldKey::EngineCode),
        description: text(FieldKey::AdditionalNote),
    }
}
