//! Portable export document: the user-downloaded backup file schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drivelog_domain::TripRecord;

use crate::error::{ImportError, PersistenceError};

/// Full snapshot of a logbook in the portable backup schema. Importing the
/// output of an export reproduces an equivalent logbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub records: Vec<TripRecord>,
    /// The exporting store's id counter. Foreign documents may omit it, in
    /// which case the importer derives a collision-free counter.
    #[serde(default)]
    pub current_id: Option<u64>,
    pub export_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ExportDocument {
    /// Parses a document from raw JSON. Anything that does not hold a
    /// `records` sequence in the expected shape is rejected as malformed.
    pub fn from_json(raw: &str) -> Result<Self, ImportError> {
        serde_json::from_str(raw).map_err(|err| ImportError::MalformedDocument(err.to_string()))
    }

    /// Serializes the document the way the downloadable backup file is
    /// written (pretty-printed).
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(|err| PersistenceError::WriteFailed(err.to_string()))
    }

    /// Conventional backup file name, stamped with the export date.
    pub fn file_name(&self) -> String {
        format!(
            "driving_log_backup_{}.json",
            self.export_date.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_without_records_is_malformed() {
        let err = ExportDocument::from_json(r#"{"currentId":4}"#).unwrap_err();
        assert!(matches!(err, ImportError::MalformedDocument(_)));

        let err = ExportDocument::from_json(r#"{"records":"not a list"}"#).unwrap_err();
        assert!(matches!(err, ImportError::MalformedDocument(_)));
    }

    #[test]
    fn document_json_round_trips() {
        let raw = r#"{
            "records": [
                {"id": 1, "datetime": "2025-06-15T09:00", "destination": "City hall", "distance": 12.0, "alcoholCheck": 0.0}
            ],
            "currentId": 2,
            "exportDate": "2025-06-15T10:00:00Z",
            "version": "0.92"
        }"#;
        let document = ExportDocument::from_json(raw).expect("parse");
        assert_eq!(document.records.len(), 1);
        assert_eq!(document.current_id, Some(2));
        assert_eq!(document.version.as_deref(), Some("0.92"));
        assert_eq!(document.file_name(), "driving_log_backup_2025-06-15.json");

        let reparsed = ExportDocument::from_json(&document.to_json().unwrap()).expect("reparse");
        assert_eq!(reparsed.records, document.records);
        assert_eq!(reparsed.current_id, document.current_id);
    }
}
