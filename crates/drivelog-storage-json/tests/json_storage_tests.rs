use std::fs;

use chrono::{NaiveDateTime, TimeZone, Utc};
use tempfile::tempdir;

use drivelog_core::{ExportDocument, ExportSink, KeyValueStore, RecordStore};
use drivelog_domain::RecordDraft;
use drivelog_storage_json::{BackupWriter, FileKeyValueStore};

fn at(datetime: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(datetime, "%Y-%m-%dT%H:%M").expect("valid datetime")
}

fn document_dated(date: &str) -> ExportDocument {
    ExportDocument {
        records: Vec::new(),
        current_id: Some(1),
        export_date: Utc
            .with_ymd_and_hms(
                date[0..4].parse().unwrap(),
                date[5..7].parse().unwrap(),
                date[8..10].parse().unwrap(),
                12,
                0,
                0,
            )
            .single()
            .expect("valid date"),
        version: Some("0.92".into()),
    }
}

#[test]
fn file_store_round_trips_values() {
    let dir = tempdir().expect("tempdir");
    let store = FileKeyValueStore::new(dir.path().to_path_buf()).expect("create store");

    assert_eq!(store.get("driving_log").expect("get"), None);

    store.set("driving_log", r#"{"records":[]}"#).expect("set");
    assert_eq!(
        store.get("driving_log").expect("get").as_deref(),
        Some(r#"{"records":[]}"#)
    );
    assert!(store.key_path("driving_log").exists());

    store.remove("driving_log").expect("remove");
    assert_eq!(store.get("driving_log").expect("get"), None);
    store.remove("driving_log").expect("removing an absent key is fine");
}

#[test]
fn failed_staged_write_preserves_the_previous_value() {
    let dir = tempdir().expect("tempdir");
    let store = FileKeyValueStore::new(dir.path().to_path_buf()).expect("create store");
    store.set("driving_log", "original").expect("initial set");

    // A directory squatting on the staging path forces File::create to fail.
    let mut tmp = store.key_path("driving_log");
    tmp.set_extension("json.tmp");
    fs::create_dir_all(&tmp).expect("block staging path");

    assert!(store.set("driving_log", "replacement").is_err());
    assert_eq!(
        store.get("driving_log").expect("get").as_deref(),
        Some("original"),
        "a failed write must not corrupt the stored value"
    );
}

#[test]
fn store_availability_probe_works_on_disk() {
    let dir = tempdir().expect("tempdir");
    let store = FileKeyValueStore::new(dir.path().to_path_buf()).expect("create store");
    assert!(store.is_available());
}

#[test]
fn record_store_persists_and_rehydrates_through_files() {
    let dir = tempdir().expect("tempdir");

    {
        let storage = FileKeyValueStore::new(dir.path().to_path_buf()).expect("create store");
        let mut store = RecordStore::open(storage);
        store
            .add(
                RecordDraft::new(at("2025-06-15T09:00"), "City hall")
                    .with_distance(12.0)
                    .with_alcohol_check(0.0),
            )
            .expect("add");
    }

    let storage = FileKeyValueStore::new(dir.path().to_path_buf()).expect("reopen store");
    let raw = storage
        .get("driving_log")
        .expect("get")
        .expect("blob written");
    let blob: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(blob["currentId"], 2);
    assert_eq!(blob["records"][0]["destination"], "City hall");

    let reopened = RecordStore::open(storage);
    assert_eq!(reopened.count(), 1);
    assert!(reopened.last_persistence_error().is_none());
}

#[test]
fn backup_writer_names_files_after_the_export_date() {
    let dir = tempdir().expect("tempdir");
    let writer = BackupWriter::new(dir.path().to_path_buf()).expect("create writer");

    writer
        .write_export(&document_dated("2025-06-15"))
        .expect("write backup");

    let path = dir.path().join("driving_log_backup_2025-06-15.json");
    assert!(path.exists());
    let raw = fs::read_to_string(&path).expect("read backup");
    let reparsed = ExportDocument::from_json(&raw).expect("backup parses back");
    assert_eq!(reparsed.current_id, Some(1));
}

#[test]
fn backup_writer_prunes_beyond_the_retention_count() {
    let dir = tempdir().expect("tempdir");
    let writer =
        BackupWriter::with_retention(dir.path().to_path_buf(), 2).expect("create writer");

    for date in ["2025-06-14", "2025-06-15", "2025-06-16"] {
        writer.write_export(&document_dated(date)).expect("write");
    }

    let backups = writer.list_backups().expect("list");
    assert_eq!(backups.len(), 2);
    assert!(!dir
        .path()
        .join("driving_log_backup_2025-06-14.json")
        .exists());
    assert!(dir
        .path()
        .join("driving_log_backup_2025-06-16.json")
        .exists());

    let names: Vec<String> = backups
        .iter()
        .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
        .map(str::to_string)
        .collect();
    assert_eq!(
        names,
        [
            "driving_log_backup_2025-06-16.json",
            "driving_log_backup_2025-06-15.json"
        ],
        "listing is newest first"
    );
}

#[test]
fn unrelated_files_are_ignored_by_the_backup_listing() {
    let dir = tempdir().expect("tempdir");
    let writer = BackupWriter::new(dir.path().to_path_buf()).expect("create writer");

    fs::write(dir.path().join("notes.txt"), "unrelated").expect("write");
    fs::write(dir.path().join("driving_log_backup_junk.json"), "{}").expect("write");
    writer
        .write_export(&document_dated("2025-06-15"))
        .expect("write backup");

    let backups = writer.list_backups().expect("list");
    assert_eq!(backups.len(), 1);
}
