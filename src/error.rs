//! Error taxonomy for extraction and item storage.

use thiserror::Error;

/// Boxed cause carried by [`ItemError::StorageUnavailable`].
pub type StorageCause = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the extractor and the item store.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The text contained no numbered entry with content.
    #[error("no numbered items found; the document must contain numbered lines such as \"1. text\" or \"2) text\"")]
    NoItemsFound,

    /// A mutation targeted an id that is not in the collection.
    #[error("item not found: {0}")]
    ItemNotFound(u64),

    /// A mutation request was missing a required field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Reading or writing the persisted collection failed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] StorageCause),
}

impl ItemError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ItemError::InvalidInput(message.into())
    }
}

impl From<std::io::Error> for ItemError {
    fn from(e: std::io::Error) -> Self {
        ItemError::StorageUnavailable(Box::new(e))
    }
}

impl From<serde_json::Error> for ItemError {
    fn from(e: serde_json::Error) -> Self {
        ItemError::StorageUnavailable(Box::new(e))
    }
}
