//! From extracted fields to a lead record.
//!
//! - `normalize`: field bag to storage columns, checkbox coercion, derived fields
//! - `assemble`: envelope + columns to a complete lead, or a rejection

pub mod assemble;
pub mod normalize;

pub use assemble::{assemble, source_descriptor};
pub use normalize::map_fields;
