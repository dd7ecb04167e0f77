//! Pure validation of candidate records, decoupled from input collection.

use std::fmt;

use drivelog_domain::{RecordDraft, TripRecord};

use crate::error::ValidationError;

/// Names a record field in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Destination,
    Distance,
    Fuel,
    AlcoholCheck,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordField::Destination => "destination",
            RecordField::Distance => "distance",
            RecordField::Fuel => "fuel",
            RecordField::AlcoholCheck => "alcohol check",
        };
        f.write_str(label)
    }
}

/// Validates a draft against the records already committed for its day.
///
/// Destination is mandatory on every record. When `same_day_records` is empty
/// the draft is the first entry of its day, which additionally makes distance
/// and the alcohol check mandatory. Numeric fields must be finite and
/// non-negative whenever supplied.
pub fn validate(
    draft: &RecordDraft,
    same_day_records: &[&TripRecord],
) -> Result<(), ValidationError> {
    if draft.destination.trim().is_empty() {
        return Err(ValidationError::MissingDestination);
    }

    check_amount(RecordField::Distance, draft.distance)?;
    check_amount(RecordField::Fuel, draft.fuel)?;
    check_amount(RecordField::AlcoholCheck, draft.alcohol_check)?;

    if same_day_records.is_empty() {
        if draft.distance.is_none() {
            return Err(ValidationError::MissingRequiredField(RecordField::Distance));
        }
        if draft.alcohol_check.is_none() {
            return Err(ValidationError::MissingRequiredField(
                RecordField::AlcoholCheck,
            ));
        }
    }

    Ok(())
}

fn check_amount(field: RecordField, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(amount) if !amount.is_finite() || amount < 0.0 => {
            Err(ValidationError::InvalidNumber(field))
        }
        _ => Ok(()),
    }
}
