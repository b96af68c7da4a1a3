use super::{normalize_database_url, prepare_database_url, resolve_settings, Settings};

use std::collections::HashMap;

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn blank_database_url_falls_back_to_default() {
    assert_eq!(
        normalize_database_url("   "),
        Settings::default().database_url
    );
}

#[test]
fn keeps_memory_url_untouched() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
}

#[test]
fn file_then_env_overrides_defaults() {
    let file = r#"
bind_addr = "0.0.0.0:4000"
database_url = "sqlite://./file.db"
"#;
    let env: HashMap<&str, &str> = HashMap::from([("APP__DATABASE_URL", "sqlite://./env.db")]);

    let settings = resolve_settings(Some(file), |key| env.get(key).map(|v| v.to_string()));
    assert_eq!(settings.server_bind, "0.0.0.0:4000");
    assert_eq!(settings.database_url, "sqlite://./env.db");
}

#[test]
fn malformed_file_is_ignored() {
    let settings = resolve_settings(Some("bind_addr = ["), |_| None);
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn prepared_database_url_creates_openable_sqlite_file() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("server.db");

    let prepared = prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare");
    let storage = storage::Storage::new(&prepared).await.expect("open sqlite");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should be created: {}",
        db_path.display()
    );
}
