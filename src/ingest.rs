//! Ingestion pipeline: document bytes → text → numbered items → store.
//!
//! Shared by `itx extract` and `POST /api/extract`. A document that cannot
//! be decoded, or that yields no items, leaves the stored collection as it
//! was.

use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::config::Config;
use crate::error::ItemError;
use crate::extract::{self, ExtractError};
use crate::models::{Collection, Item};
use crate::numbered;
use crate::store::ItemStore;

/// Why an upload could not be turned into a collection.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Items(#[from] ItemError),
}

/// Decodes `bytes` and extracts their numbered items without storing them.
pub fn extract_document(bytes: &[u8], content_type: &str) -> Result<Vec<Item>, IngestError> {
    let text = extract::extract_text(bytes, content_type)?;
    let items = numbered::extract_items(&text)?;
    Ok(items)
}

/// Runs [`extract_document`] on the blocking pool.
///
/// PDF and DOCX decoding is CPU-bound; a panicking decoder surfaces as
/// [`ExtractError::Aborted`].
pub async fn extract_document_blocking(
    bytes: Vec<u8>,
    content_type: String,
) -> Result<Vec<Item>, IngestError> {
    tokio::task::spawn_blocking(move || extract_document(&bytes, &content_type))
        .await
        .map_err(|e| ExtractError::Aborted(e.to_string()))?
}

/// Extracts items from a document and replaces the stored collection.
pub async fn ingest_document(
    store: &ItemStore,
    source_name: Option<String>,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<Collection, IngestError> {
    let items = match extract_document_blocking(bytes, content_type.to_string()).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(
                source = source_name.as_deref().unwrap_or("-"),
                content_type,
                error = %e,
                "document rejected"
            );
            return Err(e);
        }
    };
    tracing::info!(
        source = source_name.as_deref().unwrap_or("-"),
        count = items.len(),
        "extracted numbered items"
    );
    Ok(store.replace(source_name, items).await?)
}

/// CLI entry point for `itx extract <path>`.
pub async fn run_extract(
    config: &Config,
    path: &Path,
    content_type: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    let content_type = extract::resolve_content_type(content_type, name.as_deref())
        .with_context(|| {
            format!(
                "Cannot infer content type of {}; pass --content-type",
                path.display()
            )
        })?;

    if dry_run {
        let items = extract_document_blocking(bytes, content_type).await?;
        println!("dry-run: {} items found in {}", items.len(), path.display());
        for item in &items {
            println!("{}. {}", item.id, item.text);
        }
        return Ok(());
    }

    let store = ItemStore::open(config);
    let collection = ingest_document(&store, name, bytes, &content_type).await?;
    println!(
        "extracted {} items from {}",
        collection.total_items,
        path.display()
    );
    println!("saved to {}", config.storage.collection_path().display());
    Ok(())
}
