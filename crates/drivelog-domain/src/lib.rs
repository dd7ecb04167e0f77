//! drivelog-domain
//!
//! Pure domain models for the trip logbook (TripRecord, RecordDraft, Logbook,
//! MonthKey). No I/O, no storage. Only data types and pure queries.

pub mod common;
pub mod logbook;
pub mod record;

pub use common::*;
pub use logbook::*;
pub use record::*;
