//! The record store: single source of truth for trip records. Every read and
//! write to persistence flows through it.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use drivelog_domain::{DayGroup, Logbook, MonthKey, RecordDraft, TripRecord};

use crate::{
    error::{ImportError, NotFoundError, PersistenceError, ValidationError},
    storage::KeyValueStore,
    time::{Clock, SystemClock},
    transfer::ExportDocument,
    validate::validate,
};

/// Key the serialized logbook blob lives under in the key-value backend.
pub const STORAGE_KEY: &str = "driving_log";

/// Owns the logbook and mirrors it to a key-value backend after every
/// mutation. An explicit value the caller holds; there is no ambient
/// singleton.
///
/// Persistence failures never roll back a mutation: the in-memory state stays
/// authoritative for the session and the failure is kept for caller-side
/// warning display.
pub struct RecordStore<S: KeyValueStore> {
    log: Logbook,
    storage: S,
    key: String,
    clock: Arc<dyn Clock>,
    last_persistence_error: Option<PersistenceError>,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Opens a store under the default key with the system clock.
    pub fn open(storage: S) -> Self {
        Self::open_with(storage, STORAGE_KEY, Arc::new(SystemClock))
    }

    /// Opens a store, rehydrating from `get(key)`. An absent value means
    /// "start empty"; an unreadable value is reported and replaced by an
    /// empty logbook.
    pub fn open_with(storage: S, key: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let key = key.into();
        let mut last_persistence_error = None;
        let log = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Logbook>(&raw) {
                Ok(log) => log,
                Err(err) => {
                    warn!(%err, "stored logbook is unreadable, starting empty");
                    last_persistence_error = Some(PersistenceError::Corrupt(err.to_string()));
                    Logbook::new()
                }
            },
            Ok(None) => Logbook::new(),
            Err(err) => {
                warn!(%err, "could not read stored logbook, starting empty");
                last_persistence_error = Some(err);
                Logbook::new()
            }
        };
        Self {
            log,
            storage,
            key,
            clock,
            last_persistence_error,
        }
    }

    /// Validates the draft against the records already committed for its day,
    /// commits it under the next id, and persists. A rejected draft creates
    /// no record and does not advance the id counter.
    pub fn add(&mut self, draft: RecordDraft) -> Result<TripRecord, ValidationError> {
        {
            let same_day: Vec<&TripRecord> = self.log.records_for_day(draft.day()).collect();
            validate(&draft, &same_day)?;
        }
        let record = self.log.add_record(draft);
        debug!(id = record.id, day = %record.day(), "committed trip record");
        self.persist();
        Ok(record)
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[TripRecord] {
        &self.log.records
    }

    /// Records partitioned by day: newest day first, newest time first within
    /// a day, ties stable in insertion order.
    pub fn grouped_by_day(&self) -> Vec<DayGroup<'_>> {
        self.log.grouped_by_day()
    }

    /// Day groups restricted to one month when a filter is given.
    pub fn grouped_by_day_in(&self, month: Option<MonthKey>) -> Vec<DayGroup<'_>> {
        self.log.grouped_by_day_in(month)
    }

    /// Removes every record on `day` and persists. Matching nothing reports
    /// [`NotFoundError`] and changes no state.
    pub fn delete_by_day(&mut self, day: NaiveDate) -> Result<usize, NotFoundError> {
        let removed = self.log.remove_day(day);
        if removed == 0 {
            return Err(NotFoundError(day));
        }
        debug!(%day, removed, "deleted records for day");
        self.persist();
        Ok(removed)
    }

    /// Empties the logbook, restarts the id counter at 1, and persists.
    pub fn clear(&mut self) {
        self.log.clear();
        debug!("cleared all records");
        self.persist();
    }

    pub fn count(&self) -> usize {
        self.log.count()
    }

    /// Unique months with at least one record, newest first.
    pub fn distinct_months(&self) -> Vec<MonthKey> {
        self.log.distinct_months()
    }

    pub fn version(&self) -> &str {
        &self.log.version
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.log.last_update
    }

    /// Probes whether the persistence backend currently accepts writes.
    pub fn storage_available(&self) -> bool {
        self.storage.is_available()
    }

    /// Snapshot of the full state in the portable backup schema.
    pub fn export(&self) -> ExportDocument {
        ExportDocument {
            records: self.log.records.clone(),
            current_id: Some(self.log.next_id),
            export_date: self.clock.now(),
            version: Some(self.log.version.clone()),
        }
    }

    /// Replaces the entire logbook with the document's contents (no merge)
    /// and persists. A document tagged with a different version is rejected
    /// and the current state is left untouched.
    pub fn import(&mut self, document: ExportDocument) -> Result<(), ImportError> {
        if let Some(version) = &document.version {
            if *version != self.log.version {
                return Err(ImportError::VersionMismatch {
                    expected: self.log.version.clone(),
                    found: version.clone(),
                });
            }
        }
        let next_id = document.current_id.unwrap_or_else(|| {
            document
                .records
                .iter()
                .map(|record| record.id)
                .max()
                .map_or(Logbook::first_id(), |max| max + 1)
        });
        self.log.records = document.records;
        self.log.next_id = next_id;
        self.log.touch();
        debug!(count = self.log.count(), "imported logbook");
        self.persist();
        Ok(())
    }

    /// The most recent non-fatal durability failure, cleared by the next
    /// successful write. Callers surface this as a user-facing warning.
    pub fn last_persistence_error(&self) -> Option<&PersistenceError> {
        self.last_persistence_error.as_ref()
    }

    fn persist(&mut self) {
        let raw = match serde_json::to_string(&self.log) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, "could not serialize logbook");
                self.last_persistence_error = Some(PersistenceError::WriteFailed(err.to_string()));
                return;
            }
        };
        match self.storage.set(&self.key, &raw) {
            Ok(()) => self.last_persistence_error = None,
            Err(err) => {
                warn!(%err, "could not persist logbook");
                self.last_persistence_error = Some(err);
            }
        }
    }
}
