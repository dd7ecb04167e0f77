use chrono::NaiveDate;
use thiserror::Error;

use crate::validate::RecordField;

/// Raised when a candidate record is rejected. No partial record is created
/// and the id counter is not advanced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("destination is required")]
    MissingDestination,
    #[error("{0} is required for the first record of the day")]
    MissingRequiredField(RecordField),
    #[error("{0} must be a non-negative number")]
    InvalidNumber(RecordField),
}

/// Non-fatal durability failures. The in-memory logbook stays authoritative
/// for the session; only persistence is at risk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("failed to write saved data: {0}")]
    WriteFailed(String),
    #[error("saved data is unreadable: {0}")]
    Corrupt(String),
}

/// Raised when an import document is rejected. The existing logbook is left
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("import data version `{found}` does not match `{expected}`")]
    VersionMismatch { expected: String, found: String },
    #[error("import document is malformed: {0}")]
    MalformedDocument(String),
}

/// Raised by a day-scoped delete that matched nothing. No state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no records found for {0}")]
pub struct NotFoundError(pub NaiveDate);

/// Umbrella error for callers that funnel every store failure into one type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}
