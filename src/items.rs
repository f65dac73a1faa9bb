//! Item management commands: `itx list`, `update`, `delete`, `clear`.
//!
//! Thin CLI wrappers around [`ItemStore`]; results go to stdout.

use anyhow::Result;

use crate::config::Config;
use crate::store::ItemStore;

pub async fn run_list(config: &Config) -> Result<()> {
    let collection = ItemStore::open(config).read().await?;

    if collection.is_empty() {
        println!("No items stored.");
        return Ok(());
    }

    if let Some(ref name) = collection.source_name {
        println!("source:       {}", name);
    }
    if let Some(ts) = collection.extracted_at {
        println!("extracted_at: {}", ts.to_rfc3339());
    }
    println!("total_items:  {}", collection.total_items);
    println!();

    for item in &collection.items {
        println!("{}. {}", item.id, item.text);
    }
    Ok(())
}

pub async fn run_update(config: &Config, id: u64, text: String) -> Result<()> {
    let item = ItemStore::open(config).update_text(id, Some(text)).await?;
    println!("updated item {}: {}", item.id, item.text);
    Ok(())
}

pub async fn run_delete(config: &Config, id: u64) -> Result<()> {
    let collection = ItemStore::open(config).delete_one(id).await?;
    println!(
        "deleted item {} ({} remaining)",
        id, collection.total_items
    );
    Ok(())
}

pub async fn run_clear(config: &Config) -> Result<()> {
    ItemStore::open(config).delete_all().await?;
    println!("All items deleted.");
    Ok(())
}
