//! 配置加载测试

use msgstats::config::{DEFAULT_CONFIG_PATH, StaticConfig, get_config, set_config};
use tempfile::TempDir;

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let config = StaticConfig::load(path.to_str().unwrap());

    assert_eq!(config.database.database_url, "sqlite://msgstats.db?mode=rwc");
    assert_eq!(config.database.retry_count, 3);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.backfill.progress_every, None);
}

#[test]
fn test_file_values_override_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("msgstats.toml");
    std::fs::write(
        &path,
        r#"
[database]
database_url = "postgres://stats@db/platform"
pool_size = 12

[logging]
format = "json"

[backfill]
progress_every = 250
"#,
    )
    .unwrap();

    let config = StaticConfig::load(path.to_str().unwrap());
    assert_eq!(config.database.database_url, "postgres://stats@db/platform");
    assert_eq!(config.database.pool_size, 12);
    // 未设置的键保持默认
    assert_eq!(config.database.timeout, 30);
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.backfill.progress_every, Some(250));
}

#[test]
fn test_saved_sample_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join(DEFAULT_CONFIG_PATH);

    StaticConfig::default().save_to_file(&path).unwrap();
    let loaded = StaticConfig::load(path.to_str().unwrap());

    assert_eq!(loaded.database.pool_size, 5);
    assert_eq!(loaded.logging.max_backups, 5);
    assert!(loaded.logging.enable_rotation);
}

#[test]
fn test_set_config_replaces_global() {
    let mut config = StaticConfig::default();
    config.backfill.progress_every = Some(42);
    config.database.retry_count = 0;
    set_config(config.clone());

    let current = get_config();
    assert_eq!(current.backfill.progress_every, Some(42));
    assert_eq!(current.database.retry_count, 0);

    // 已初始化后再次设置会整体替换
    config.backfill.progress_every = None;
    set_config(config);
    assert_eq!(get_config().backfill.progress_every, None);
    assert_eq!(get_config().database.retry_count, 0);
}
