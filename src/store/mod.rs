//! Single-document item storage.
//!
//! The [`ItemStorage`] trait is the raw persistence seam: load and save one
//! [`Collection`]. [`ItemStore`] layers the item operations on top of it:
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`read`](ItemStore::read) | Current collection, or an empty one |
//! | [`replace`](ItemStore::replace) | Overwrite with a fresh extraction |
//! | [`update_text`](ItemStore::update_text) | Replace one item's text |
//! | [`delete_one`](ItemStore::delete_one) | Remove one item by id |
//! | [`delete_all`](ItemStore::delete_all) | Empty the item list |
//!
//! Every mutation is a read-modify-write of the whole document. There is no
//! locking: concurrent writers race and the last write wins. Callers that
//! need stronger guarantees must serialise access themselves.

pub mod json_file;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::config::Config;
use crate::error::ItemError;
use crate::models::{Collection, Item};

pub use json_file::JsonFileStorage;
pub use memory::InMemoryStorage;

/// Raw persistence for the one live [`Collection`].
///
/// Implementations must be `Send + Sync` to be shared across request
/// handlers.
#[async_trait]
pub trait ItemStorage: Send + Sync {
    /// Load the stored collection. `Ok(None)` means nothing was written yet.
    async fn load(&self) -> Result<Option<Collection>, ItemError>;

    /// Replace the stored collection in full.
    async fn save(&self, collection: &Collection) -> Result<(), ItemError>;
}

/// Item operations over an injected [`ItemStorage`].
#[derive(Clone)]
pub struct ItemStore {
    storage: Arc<dyn ItemStorage>,
}

impl ItemStore {
    pub fn new(storage: Arc<dyn ItemStorage>) -> Self {
        Self { storage }
    }

    /// Opens the file-backed store described by `config.storage`.
    pub fn open(config: &Config) -> Self {
        Self::new(Arc::new(JsonFileStorage::new(
            config.storage.collection_path(),
        )))
    }

    /// Store backed by an empty [`InMemoryStorage`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStorage::new()))
    }

    pub async fn read(&self) -> Result<Collection, ItemError> {
        let mut collection = self.storage.load().await?.unwrap_or_default();
        collection.recount();
        Ok(collection)
    }

    /// Overwrites the stored collection with freshly extracted `items`.
    pub async fn replace(
        &self,
        source_name: Option<String>,
        items: Vec<Item>,
    ) -> Result<Collection, ItemError> {
        let collection = Collection::extracted(source_name, items, Utc::now());
        self.storage.save(&collection).await?;
        tracing::info!(
            total_items = collection.total_items,
            source = collection.source_name.as_deref().unwrap_or("-"),
            "replaced item collection"
        );
        Ok(collection)
    }

    /// Sets the text of the first item with `id`.
    ///
    /// `text` of `None` is a missing field and fails with
    /// [`ItemError::InvalidInput`]. An empty string is accepted.
    pub async fn update_text(&self, id: u64, text: Option<String>) -> Result<Item, ItemError> {
        if id == 0 {
            return Err(ItemError::invalid_input("id is required"));
        }
        let text = text.ok_or_else(|| ItemError::invalid_input("text is required"))?;

        let mut collection = self.read().await?;
        let item = collection
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(ItemError::ItemNotFound(id))?;
        item.text = text;
        let updated = item.clone();

        self.storage.save(&collection).await?;
        tracing::debug!(id, "updated item text");
        Ok(updated)
    }

    /// Removes every item with `id`.
    pub async fn delete_one(&self, id: u64) -> Result<Collection, ItemError> {
        let mut collection = self.read().await?;
        let before = collection.items.len();
        collection.items.retain(|item| item.id != id);
        if collection.items.len() == before {
            return Err(ItemError::ItemNotFound(id));
        }
        collection.recount();

        self.storage.save(&collection).await?;
        tracing::debug!(id, remaining = collection.total_items, "deleted item");
        Ok(collection)
    }

    /// Empties the item list, keeping the other metadata.
    pub async fn delete_all(&self) -> Result<Collection, ItemError> {
        let mut collection = self.read().await?;
        collection.items.clear();
        collection.recount();

        self.storage.save(&collection).await?;
        tracing::info!("cleared all items");
        Ok(collection)
    }
}
