//! Export the stored collection as JSON or numbered plain text.
//!
//! The text form writes one `"{id}. {text}"` entry per item with a blank line
//! between entries, so it can be fed back through extraction.

use std::path::Path;
use std::str::FromStr;

use anyhow::Result;

use crate::config::Config;
use crate::models::Collection;
use crate::store::ItemStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Txt,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Txt => "text/plain; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Txt => "txt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "txt" | "text" => Ok(ExportFormat::Txt),
            other => Err(format!("unknown export format '{}': use json or txt", other)),
        }
    }
}

pub fn render(collection: &Collection, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(collection)?),
        ExportFormat::Txt => Ok(render_text(collection)),
    }
}

fn render_text(collection: &Collection) -> String {
    collection
        .items
        .iter()
        .map(|item| format!("{}. {}", item.id, item.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Suggested download name: the source name without its extension, or
/// `items` when the collection has no source.
///
/// Quotes, backslashes and control characters become `_` so the name can sit
/// inside a quoted `Content-Disposition` parameter.
pub fn file_name(collection: &Collection, format: ExportFormat) -> String {
    let stem = collection
        .source_name
        .as_deref()
        .and_then(|n| Path::new(n).file_stem())
        .map(|s| {
            s.to_string_lossy()
                .chars()
                .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
                .collect::<String>()
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "items".to_string());
    format!("{}.{}", stem, format.extension())
}

/// Export the collection.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(config: &Config, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let collection = ItemStore::open(config).read().await?;
    let body = render(&collection, format)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &body)?;
            eprintln!(
                "Exported {} items to {}",
                collection.total_items,
                path.display()
            );
        }
        None => {
            println!("{}", body);
        }
    }
    Ok(())
}
