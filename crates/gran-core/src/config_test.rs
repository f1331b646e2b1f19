use super::*;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: test_project").unwrap();
    assert_eq!(config.name, "test_project");
    assert_eq!(config.migrations_path, "migrations");
    assert_eq!(config.batch_terminator, "GO");
    assert_eq!(config.database.path, ":memory:");
    assert_eq!(config.history.schema, "main");
    assert_eq!(config.history.table, "__migration_history");
    assert!(config.lock.enabled);
    assert_eq!(config.lock.expiry_secs, 300);
    assert_eq!(config, Config::new("test_project"));
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: shop
migrations_path: db/migrations
batch_terminator: go
database:
  path: "shop.duckdb"
history:
  schema: ops
  table: schema_history
lock:
  enabled: false
  expiry_secs: 60
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.migrations_path, "db/migrations");
    assert_eq!(config.batch_terminator, "go");
    assert_eq!(config.history.schema, "ops");
    assert_eq!(config.history.table, "schema_history");
    assert!(!config.lock.enabled);
    assert_eq!(config.lock.expiry_secs, 60);
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: x\nconnection_string: foo");
    assert!(result.is_err());
}

#[test]
fn test_validate_rejects_bad_history_identifier() {
    let mut config = Config::new("x");
    config.history.table = "history; DROP TABLE users".to_string();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
    assert!(err.to_string().contains("history.table"));
}

#[test]
fn test_validate_rejects_multi_token_terminator() {
    let mut config = Config::new("x");
    config.batch_terminator = "GO NOW".to_string();
    assert!(config.validate().is_err());

    config.batch_terminator = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_empty_name() {
    let config = Config::new("");
    assert!(matches!(
        config.validate(),
        Err(CoreError::ConfigInvalid { .. })
    ));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
    assert!(err.to_string().contains("[G001]"));
}

#[test]
fn test_load_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "name: [unclosed").unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParseError { .. }));
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::new("roundtrip");
    config.database.path = "app.duckdb".to_string();

    let path = config.save(dir.path()).unwrap();
    assert_eq!(path, dir.path().join(CONFIG_FILE_NAME));

    let loaded = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_yaml_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(ALT_CONFIG_FILE_NAME), "name: alt").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "alt");
}

#[test]
fn test_discover_walks_up() {
    let dir = tempfile::tempdir().unwrap();
    Config::new("proj").save(dir.path()).unwrap();
    let nested = dir.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();

    assert_eq!(Config::discover(&nested), Some(dir.path().to_path_buf()));
}

#[test]
fn test_discover_none_without_config() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("empty");
    std::fs::create_dir_all(&nested).unwrap();
    // Ancestors of the temp dir are outside this test's control.
    let found = Config::discover(&nested);
    assert!(found.map_or(true, |p| !p.starts_with(dir.path())));
}

#[test]
fn test_paths_absolute() {
    let root = PathBuf::from("/srv/app");
    let mut config = Config::new("x");
    assert_eq!(config.migrations_path_absolute(&root), root.join("migrations"));
    assert_eq!(config.database_path_absolute(&root), None);

    config.database.path = "data/app.duckdb".to_string();
    assert_eq!(
        config.database_path_absolute(&root),
        Some(root.join("data/app.duckdb"))
    );
}
