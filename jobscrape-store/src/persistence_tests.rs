//! Persistence helper tests.

use std::path::PathBuf;
use tempfile::TempDir;

use crate::config::Config;
use crate::persistence::{ensure_parent_dir, load_json, save_json};

#[tokio::test]
async fn test_save_and_load_config_json() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("config.json");

    let mut config = Config::default();
    config.classifier.model = "gpt-4o-mini".to_string();
    config.fetch.pagination.max_pages = 7;

    save_json(&file_path, &config).await.unwrap();
    let loaded: Config = load_json(&file_path).await.unwrap();

    assert_eq!(loaded.classifier.model, "gpt-4o-mini");
    assert_eq!(loaded.fetch, config.fetch);
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("a").join("b").join("config.json");

    save_json(&nested, &serde_json::json!({"key": "value"}))
        .await
        .unwrap();

    assert!(nested.exists());
    assert!(!nested.with_extension("json.tmp").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("secret.json");
    save_json(&file_path, &Config::default()).await.unwrap();

    let mode = std::fs::metadata(&file_path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[tokio::test]
async fn test_load_nonexistent_file_errors() {
    let path = PathBuf::from("/nonexistent/jobscrape/config.json");
    let result: Result<Config, _> = load_json(&path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_load_corrupt_json_errors() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("bad.json");
    tokio::fs::write(&file_path, "{ nope").await.unwrap();

    let result: Result<Config, _> = load_json(&file_path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_ensure_parent_dir_handles_bare_file_name() {
    ensure_parent_dir(&PathBuf::from("config.json")).await.unwrap();
}
