//! Core data models shared by the extractor, the store and the transports.
//!
//! The persisted document is a single [`Collection`]. Field names are
//! serialized in camelCase (`sourceName`, `extractedAt`, `totalItems`) so the
//! on-disk file and the HTTP responses share one shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One numbered entry.
///
/// `id` comes from the source numbering. It is not required to be contiguous
/// and the extractor does not enforce uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub text: String,
}

impl Item {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// The single persisted set of items plus metadata.
///
/// `total_items == items.len()` after every successful write; use
/// [`Collection::recount`] after mutating `items` directly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Name of the uploaded document. Older files call this `filename`.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "filename")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_items: usize,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Collection {
    /// Builds a freshly extracted collection stamped with `extracted_at`.
    pub fn extracted(
        source_name: Option<String>,
        items: Vec<Item>,
        extracted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_name,
            extracted_at: Some(extracted_at),
            total_items: items.len(),
            items,
        }
    }

    pub fn recount(&mut self) {
        self.total_items = self.items.len();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
