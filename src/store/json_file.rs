//! File-backed [`ItemStorage`]: one pretty-printed JSON document.
//!
//! A missing file reads as "nothing stored yet". The parent directory is
//! created on the first write. Each save writes its own uniquely named temp
//! file in the same directory and persists it over the target, so readers
//! see either the old or the new document and concurrent saves never share a
//! temp file. The last save to persist wins.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::fs;

use crate::error::ItemError;
use crate::models::Collection;

use super::ItemStorage;

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Writes `json` to a fresh temp file beside `path` and persists it over `path`.
fn write_atomic(path: &Path, json: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl ItemStorage for JsonFileStorage {
    async fn load(&self) -> Result<Option<Collection>, ItemError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let collection = serde_json::from_str(&raw).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "stored collection is not valid JSON");
            ItemError::from(e)
        })?;
        Ok(Some(collection))
    }

    async fn save(&self, collection: &Collection) -> Result<(), ItemError> {
        let json = serde_json::to_vec_pretty(collection)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .map_err(|e| ItemError::StorageUnavailable(Box::new(e)))??;

        tracing::debug!(
            path = %self.path.display(),
            total_items = collection.total_items,
            "wrote item collection"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let tmp = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(tmp.path().join("items.json"));
        assert!(storage.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_creates_data_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("data").join("items.json");
        let storage = JsonFileStorage::new(&path);

        let collection = Collection {
            total_items: 1,
            items: vec![Item::new(1, "one")],
            ..Default::default()
        };
        storage.save(&collection).await.unwrap();

        assert!(path.exists());
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1, "temp files must not be left behind");
        assert_eq!(storage.load().await.unwrap(), Some(collection));
    }

    #[tokio::test]
    async fn file_uses_camel_case_document_shape() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("items.json");
        let storage = JsonFileStorage::new(&path);
        storage
            .save(&Collection {
                source_name: Some("a.pdf".to_string()),
                total_items: 1,
                items: vec![Item::new(3, "three")],
                ..Default::default()
            })
            .await
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["sourceName"], "a.pdf");
        assert_eq!(raw["totalItems"], 1);
        assert_eq!(raw["items"][0]["id"], 3);
    }

    #[tokio::test]
    async fn corrupt_file_is_storage_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("items.json");
        std::fs::write(&path, "{ not json").unwrap();
        let storage = JsonFileStorage::new(&path);

        let err = storage.load().await.unwrap_err();
        assert!(matches!(err, ItemError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn save_overwrites_previous_document() {
        let tmp = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(tmp.path().join("items.json"));
        let first = Collection {
            total_items: 2,
            items: vec![Item::new(1, "a"), Item::new(2, "b")],
            ..Default::default()
        };
        let second = Collection::default();
        storage.save(&first).await.unwrap();
        storage.save(&second).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn unwritable_location_is_storage_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        let storage = JsonFileStorage::new(blocker.join("items.json"));

        let err = storage.save(&Collection::default()).await.unwrap_err();
        assert!(matches!(err, ItemError::StorageUnavailable(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_all_succeed_and_last_write_wins() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("items.json");
        let storage = std::sync::Arc::new(JsonFileStorage::new(&path));

        for round in 0..20u64 {
            let writers: Vec<_> = (1..=8u64)
                .map(|n| {
                    let storage = storage.clone();
                    let items: Vec<Item> = (1..=n * 50)
                        .map(|id| Item::new(id, format!("round {} writer {} item {}", round, n, id)))
                        .collect();
                    tokio::spawn(async move {
                        let collection = Collection {
                            total_items: items.len(),
                            items,
                            ..Default::default()
                        };
                        storage.save(&collection).await
                    })
                })
                .collect();
            for writer in writers {
                writer.await.unwrap().unwrap();
            }

            let stored = storage.load().await.unwrap().unwrap();
            assert_eq!(stored.total_items, stored.items.len());
            assert!(stored.items.iter().all(|i| i.text.starts_with(&format!("round {} ", round))));
        }

        let entries = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(entries, 1, "temp files must not be left behind");
    }
}
