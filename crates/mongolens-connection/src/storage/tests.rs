//! Tests for the storage module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn local() -> SavedConnection {
    SavedConnection::new("local", "mongodb://localhost:27017").with_id("local")
}

#[tokio::test]
async fn test_memory_storage_flags_default_to_false() {
    let storage = MemoryStorage::new();
    assert!(!storage.get_flag("GLOBAL_HAS_BEEN_SHOWN_INITIAL_VIEW").await.unwrap());

    storage
        .update("GLOBAL_HAS_BEEN_SHOWN_INITIAL_VIEW", json!(true))
        .await
        .unwrap();
    assert!(storage.get_flag("GLOBAL_HAS_BEEN_SHOWN_INITIAL_VIEW").await.unwrap());

    storage.update("not_a_bool", json!("yes")).await.unwrap();
    assert!(!storage.get_flag("not_a_bool").await.unwrap());
}

#[tokio::test]
async fn test_memory_storage_upserts_by_id() {
    let storage = MemoryStorage::with_connections([local()]);

    let mut renamed = local();
    renamed.name = "renamed".to_string();
    storage.save_connection(renamed).await.unwrap();

    let saved = storage.saved_connections().await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "renamed");

    assert!(storage.remove_connection(&"local".into()).await.unwrap());
    assert!(!storage.remove_connection(&"local".into()).await.unwrap());
    assert!(!storage.has_saved_connections().await.unwrap());
}

#[tokio::test]
async fn test_json_storage_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonFileStorage::open(dir.path().join("storage.json"))
        .await
        .unwrap();

    assert!(storage.saved_connections().await.unwrap().is_empty());
    assert_eq!(storage.get("anything").await.unwrap(), None);
}

#[tokio::test]
async fn test_json_storage_writes_through_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("storage.json");

    {
        let storage = JsonFileStorage::open(&path).await.unwrap();
        storage.save_connection(local()).await.unwrap();
        storage.update("theme", json!("dark")).await.unwrap();
    }

    assert!(path.exists());

    let reopened = JsonFileStorage::open(&path).await.unwrap();
    let saved = reopened.saved_connection(&"local".into()).await.unwrap();
    assert_eq!(saved.map(|c| c.name), Some("local".to_string()));
    assert_eq!(reopened.get("theme").await.unwrap(), Some(json!("dark")));
}

#[tokio::test]
async fn test_json_storage_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = JsonFileStorage::open(&path).await;
    assert!(matches!(result, Err(MongolensError::Storage(_))));
}
