use std::{cmp::Reverse, collections::BTreeMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    common::MonthKey,
    record::{RecordDraft, TripRecord},
};

/// Version tag written into persisted blobs and export documents. Imports
/// carrying a different tag are rejected.
pub const DATA_VERSION: &str = "0.92";

/// The full logbook state: every committed record plus the id counter.
/// Insertion order of `records` is not meaningful; display order is always
/// re-derived by [`Logbook::grouped_by_day`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logbook {
    #[serde(default)]
    pub records: Vec<TripRecord>,
    #[serde(default = "Logbook::first_id", rename = "currentId")]
    pub next_id: u64,
    #[serde(default = "Logbook::data_version_default")]
    pub version: String,
    #[serde(default = "Utc::now")]
    pub last_update: DateTime<Utc>,
}

impl Default for Logbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Logbook {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: Self::first_id(),
            version: Self::data_version_default(),
            last_update: Utc::now(),
        }
    }

    /// Assigns the next id, appends the draft as a committed record, and
    /// returns a copy of it.
    pub fn add_record(&mut self, draft: RecordDraft) -> TripRecord {
        let id = self.next_id;
        self.next_id += 1;
        let record = draft.into_record(id);
        self.records.push(record.clone());
        self.touch();
        record
    }

    /// Removes every record on `day`; returns how many were removed.
    pub fn remove_day(&mut self, day: NaiveDate) -> usize {
        let before = self.records.len();
        self.records.retain(|record| record.day() != day);
        let removed = before - self.records.len();
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// Drops all records and restarts the id counter.
    pub fn clear(&mut self) {
        self.records.clear();
        self.next_id = Self::first_id();
        self.touch();
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn records_for_day(&self, day: NaiveDate) -> impl Iterator<Item = &TripRecord> {
        self.records.iter().filter(move |record| record.day() == day)
    }

    /// Partitions records into day groups: newest day first, records within a
    /// day newest first. Equal timestamps keep insertion order.
    pub fn grouped_by_day(&self) -> Vec<DayGroup<'_>> {
        self.grouped_by_day_in(None)
    }

    /// Same as [`Logbook::grouped_by_day`], restricted to one month when a
    /// filter is given.
    pub fn grouped_by_day_in(&self, month: Option<MonthKey>) -> Vec<DayGroup<'_>> {
        let mut groups: BTreeMap<NaiveDate, Vec<&TripRecord>> = BTreeMap::new();
        for record in &self.records {
            let day = record.day();
            if month.is_some_and(|filter| !filter.contains(day)) {
                continue;
            }
            groups.entry(day).or_default().push(record);
        }
        groups
            .into_iter()
            .rev()
            .map(|(day, mut records)| {
                records.sort_by_key(|record| Reverse(record.datetime));
                DayGroup { day, records }
            })
            .collect()
    }

    /// Unique months with at least one record, newest first.
    pub fn distinct_months(&self) -> Vec<MonthKey> {
        let mut months: Vec<MonthKey> = self.records.iter().map(TripRecord::month).collect();
        months.sort_unstable_by_key(|month| Reverse(*month));
        months.dedup();
        months
    }

    pub fn touch(&mut self) {
        self.last_update = Utc::now();
    }

    pub fn first_id() -> u64 {
        1
    }

    pub fn data_version_default() -> String {
        DATA_VERSION.into()
    }
}

/// All records of one calendar day, ordered newest first.
#[derive(Debug)]
pub struct DayGroup<'a> {
    pub day: NaiveDate,
    pub records: Vec<&'a TripRecord>,
}
