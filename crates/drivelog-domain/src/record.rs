//! Domain models for individual trip entries.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::common::MonthKey;

/// One committed trip entry. Records are immutable once committed; the only
/// removal path is deleting a whole day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    pub id: u64,
    #[serde(with = "datetime_minutes")]
    pub datetime: NaiveDateTime,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Kilometers driven. Required on a day's first record.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Liters refueled.
    #[serde(default)]
    pub fuel: Option<f64>,
    /// Breath alcohol reading in mg/L. Required on a day's first record.
    #[serde(default)]
    pub alcohol_check: Option<f64>,
}

impl TripRecord {
    /// Returns the calendar day this record belongs to for grouping.
    pub fn day(&self) -> NaiveDate {
        self.datetime.date()
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::from(self.day())
    }
}

/// Candidate input for a new record, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    #[serde(with = "datetime_minutes")]
    pub datetime: NaiveDateTime,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub fuel: Option<f64>,
    #[serde(default)]
    pub alcohol_check: Option<f64>,
}

impl RecordDraft {
    pub fn new(datetime: NaiveDateTime, destination: impl Into<String>) -> Self {
        Self {
            datetime,
            destination: destination.into(),
            purpose: None,
            distance: None,
            fuel: None,
            alcohol_check: None,
        }
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn with_distance(mut self, kilometers: f64) -> Self {
        self.distance = Some(kilometers);
        self
    }

    pub fn with_fuel(mut self, liters: f64) -> Self {
        self.fuel = Some(liters);
        self
    }

    pub fn with_alcohol_check(mut self, reading: f64) -> Self {
        self.alcohol_check = Some(reading);
        self
    }

    pub fn day(&self) -> NaiveDate {
        self.datetime.date()
    }

    /// Seals the draft into a committed record under the given id.
    pub fn into_record(self, id: u64) -> TripRecord {
        TripRecord {
            id,
            datetime: self.datetime,
            destination: self.destination,
            purpose: self.purpose,
            distance: self.distance,
            fuel: self.fuel,
            alcohol_check: self.alcohol_check,
        }
    }
}

/// Minute-precision timestamp format (`YYYY-MM-DDTHH:MM`), the format the
/// persisted blobs and export documents carry. Deserialization also accepts
/// a trailing seconds component from older data.
pub mod datetime_minutes {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M";
    const FORMAT_WITH_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&raw, FORMAT_WITH_SECONDS))
            .map_err(de::Error::custom)
    }
}
