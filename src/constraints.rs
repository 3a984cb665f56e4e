//! Validation and persistence attributes mapped to schema constraints.

use crate::attributes::{find_attributes, AttributeArgs};
use log::debug;
use syn::Attribute;

const NOT_EMPTY_ATTRIBUTE: &str = "not_empty";
const NOT_NULL_ATTRIBUTE: &str = "not_null";
const MIN_ATTRIBUTE: &str = "min";
const MAX_ATTRIBUTE: &str = "max";
const COLUMN_ATTRIBUTE: &str = "column";
const SIZE_ATTRIBUTE: &str = "size";
const VALIDATE_ATTRIBUTE: &str = "validate";

/// Constraints of a single field or getter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintRecord {
    pub required: bool,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl ConstraintRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Reads the recognized markers of a declaration.
///
/// Families are applied in a fixed order, later ones overwriting earlier ones:
/// not-empty, not-null, min/max values, column and finally size. A size maximum never
/// replaces a column length.
pub fn extract(attrs: &[Attribute]) -> ConstraintRecord {
    let mut record = ConstraintRecord::default();

    if find_attributes(attrs, NOT_EMPTY_ATTRIBUTE).next().is_some() {
        record.required = true;
        record.min_length = Some(1);
    }

    if find_attributes(attrs, NOT_NULL_ATTRIBUTE).next().is_some() {
        record.required = true;
    }
    let validations: Vec<AttributeArgs> = find_attributes(attrs, VALIDATE_ATTRIBUTE)
        .map(AttributeArgs::from_attribute)
        .collect();
    if validations.iter().any(|args| args.has_flag("required")) {
        record.required = true;
    }

    for attr in find_attributes(attrs, MIN_ATTRIBUTE) {
        if let Some(value) = AttributeArgs::from_attribute(attr).single_int() {
            record.min = Some(value);
        }
    }
    for attr in find_attributes(attrs, MAX_ATTRIBUTE) {
        if let Some(value) = AttributeArgs::from_attribute(attr).single_int() {
            record.max = Some(value);
        }
    }
    for range in validations.iter().filter_map(|args| args.nested("range")) {
        if let Some(min) = range.int("min") {
            record.min = Some(min);
        }
        if let Some(max) = range.int("max") {
            record.max = Some(max);
        }
    }

    let mut column_length = false;
    for attr in find_attributes(attrs, COLUMN_ATTRIBUTE) {
        let args = AttributeArgs::from_attribute(attr);
        if let Some(nullable) = args.bool("nullable") {
            record.required = !nullable;
        }
        if let Some(length) = args.int("length") {
            record.max_length = Some(length);
            column_length = true;
        }
    }

    let sizes = find_attributes(attrs, SIZE_ATTRIBUTE)
        .map(AttributeArgs::from_attribute)
        .chain(
            validations
                .iter()
                .filter_map(|args| args.nested("length"))
                .cloned(),
        );
    for size in sizes {
        if let Some(min) = size.int("min") {
            record.min_length = Some(min);
        }
        if let Some(max) = size.int("max") {
            if !column_length {
                record.max_length = Some(max);
            }
        }
    }

    if !record.is_empty() {
        debug!("Extracted constraints {:?}", record);
    }
    record
}
