use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Stores user-configurable logbook preferences and storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    /// Minutes between silent backups.
    #[serde(default = "Config::default_auto_backup_minutes")]
    pub auto_backup_minutes: u64,
    /// Backup files kept before the oldest are pruned.
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the logbook data file. Defaults to
    /// `~/Documents/DrivingLog`.
    pub data_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for backup files. Defaults to
    /// `~/Documents/DrivingLog/backups`.
    pub backup_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "ja-JP".into(),
            auto_backup_minutes: Self::default_auto_backup_minutes(),
            backup_retention: Self::default_backup_retention(),
            data_dir: None,
            backup_dir: None,
        }
    }
}

impl Config {
    pub fn default_auto_backup_minutes() -> u64 {
        5
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("DrivingLog")
    }

    pub fn resolve_backup_dir(&self) -> PathBuf {
        if let Some(path) = &self.backup_dir {
            return path.clone();
        }

        self.resolve_data_dir().join("backups")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_backup_cadence() {
        let config = Config::default();
        assert_eq!(config.auto_backup_minutes, 5);
        assert_eq!(config.backup_retention, 5);
        assert_eq!(config.locale, "ja-JP");
    }

    #[test]
    fn custom_directories_take_precedence() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/logbook")),
            backup_dir: Some(PathBuf::from("/tmp/logbook-backups")),
            ..Config::default()
        };
        assert_eq!(config.resolve_data_dir(), PathBuf::from("/tmp/logbook"));
        assert_eq!(
            config.resolve_backup_dir(),
            PathBuf::from("/tmp/logbook-backups")
        );
    }

    #[test]
    fn backup_dir_defaults_under_the_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/logbook")),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_backup_dir(),
            PathBuf::from("/tmp/logbook/backups")
        );
    }
}
