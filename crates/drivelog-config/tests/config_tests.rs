use drivelog_config::{Config, ConfigManager};
use tempfile::tempdir;

#[test]
fn load_without_a_saved_file_returns_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let config = manager.load().expect("load");
    assert_eq!(config.auto_backup_minutes, 5);
    assert!(config.data_dir.is_none());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut config = Config::default();
    config.auto_backup_minutes = 15;
    config.backup_retention = 3;
    config.data_dir = Some(dir.path().join("data"));
    manager.save(&config).expect("save");

    assert!(manager.config_path().exists());
    let loaded = manager.load().expect("load");
    assert_eq!(loaded.auto_backup_minutes, 15);
    assert_eq!(loaded.backup_retention, 3);
    assert_eq!(loaded.data_dir, Some(dir.path().join("data")));
}

#[test]
fn partial_config_files_fill_in_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    std::fs::write(manager.config_path(), r#"{"locale":"en-US"}"#).expect("write");
    let loaded = manager.load().expect("load");
    assert_eq!(loaded.locale, "en-US");
    assert_eq!(loaded.auto_backup_minutes, 5);
}
