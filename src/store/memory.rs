//! In-memory [`ItemStorage`] for tests and embedding.
//!
//! Holds the collection behind `std::sync::RwLock`. Saves clone the whole
//! document, matching the full-rewrite semantics of the file backend.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::ItemError;
use crate::models::Collection;

use super::ItemStorage;

pub struct InMemoryStorage {
    collection: RwLock<Option<Collection>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            collection: RwLock::new(None),
        }
    }

    /// Storage that already holds `collection`.
    pub fn with_collection(collection: Collection) -> Self {
        Self {
            collection: RwLock::new(Some(collection)),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStorage for InMemoryStorage {
    async fn load(&self) -> Result<Option<Collection>, ItemError> {
        Ok(self.collection.read().unwrap().clone())
    }

    async fn save(&self, collection: &Collection) -> Result<(), ItemError> {
        *self.collection.write().unwrap() = Some(collection.clone());
        Ok(())
    }
}
