//! drivelog-storage-json
//!
//! Filesystem-backed adapters for the logbook: a key-value store keeping one
//! JSON file per key, and a backup sink writing dated export files with
//! retention pruning.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

use drivelog_core::{ExportDocument, ExportSink, KeyValueStore, PersistenceError};

const STORE_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";
const BACKUP_PREFIX: &str = "driving_log_backup_";
const BACKUP_DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of backup files kept before the oldest are pruned.
pub const DEFAULT_RETENTION: usize = 5;

/// Key-value backend keeping one `<key>.json` file per key under a root
/// directory. Writes stage to a temporary file and rename into place.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: PathBuf) -> Result<Self, PersistenceError> {
        fs::create_dir_all(&root)
            .map_err(|err| PersistenceError::WriteFailed(err.to_string()))?;
        Ok(Self { root })
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}", key, STORE_EXTENSION))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(PersistenceError::Corrupt(err.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.key_path(key);
        let tmp = tmp_path(&path);
        write_atomic(&tmp, value)?;
        fs::rename(&tmp, &path).map_err(|err| PersistenceError::WriteFailed(err.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PersistenceError::WriteFailed(err.to_string())),
        }
    }
}

/// Export sink writing `driving_log_backup_YYYY-MM-DD.json` files into a
/// backup directory, pruning beyond a retention count (oldest first).
#[derive(Debug, Clone)]
pub struct BackupWriter {
    dir: PathBuf,
    retention: usize,
}

impl BackupWriter {
    pub fn new(dir: PathBuf) -> Result<Self, PersistenceError> {
        Self::with_retention(dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(dir: PathBuf, retention: usize) -> Result<Self, PersistenceError> {
        fs::create_dir_all(&dir).map_err(|err| PersistenceError::WriteFailed(err.to_string()))?;
        Ok(Self {
            dir,
            retention: retention.max(1),
        })
    }

    /// Backup files currently on disk, newest first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, PersistenceError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        let dir = fs::read_dir(&self.dir)
            .map_err(|err| PersistenceError::Corrupt(err.to_string()))?;
        for entry in dir {
            let entry = entry.map_err(|err| PersistenceError::Corrupt(err.to_string()))?;
            let path = entry.path();
            let name = match path.file_name().and_then(|name| name.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if backup_date(name).is_some() {
                entries.push(path);
            }
        }
        entries.sort_by_key(|path| {
            Reverse(
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(backup_date),
            )
        });
        Ok(entries)
    }

    fn prune(&self) {
        let Ok(entries) = self.list_backups() else {
            return;
        };
        for stale in entries.into_iter().skip(self.retention) {
            let _ = fs::remove_file(stale);
        }
    }
}

impl ExportSink for BackupWriter {
    fn write_export(&self, document: &ExportDocument) -> Result<(), PersistenceError> {
        let path = self.dir.join(document.file_name());
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &document.to_json()?)?;
        fs::rename(&tmp, &path).map_err(|err| PersistenceError::WriteFailed(err.to_string()))?;
        self.prune();
        Ok(())
    }
}

fn backup_date(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_suffix(&format!(".{}", STORE_EXTENSION))?;
    let raw = stem.strip_prefix(BACKUP_PREFIX)?;
    NaiveDate::parse_from_str(raw, BACKUP_DATE_FORMAT).ok()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| PersistenceError::WriteFailed(err.to_string()))?;
    }
    let mut file =
        File::create(path).map_err(|err| PersistenceError::WriteFailed(err.to_string()))?;
    file.write_all(data.as_bytes())
        .map_err(|err| PersistenceError::WriteFailed(err.to_string()))?;
    file.flush()
        .map_err(|err| PersistenceError::WriteFailed(err.to_string()))
}
