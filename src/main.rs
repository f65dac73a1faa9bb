//! # Item Extractor CLI (`itx`)
//!
//! ## Usage
//!
//! ```bash
//! itx --config ./config/itx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `itx extract <path>` | Extract numbered items from a document and store them |
//! | `itx list` | Print the stored collection |
//! | `itx update <id> <text>` | Replace one item's text |
//! | `itx delete <id>` | Delete one item |
//! | `itx clear` | Delete all items |
//! | `itx export` | Export the collection as JSON or text |
//! | `itx serve` | Start the HTTP API |
//!
//! When the config file does not exist, built-in defaults are used
//! (`./data/items.json`, bind `127.0.0.1:7340`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use item_extractor::export::ExportFormat;
use item_extractor::{config, export, ingest, items, server};

/// Item Extractor CLI: numbered items from documents, stored as one JSON
/// collection.
#[derive(Parser)]
#[command(
    name = "itx",
    about = "Extract numbered items from documents and manage the stored collection",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/itx.toml`. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "./config/itx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract numbered items from a document.
    ///
    /// Replaces the stored collection unless `--dry-run` is given.
    /// Supported: PDF, DOCX, plain text and Markdown.
    Extract {
        /// Document to read.
        path: PathBuf,

        /// Content type override (e.g. `text/plain`); inferred from the
        /// extension otherwise.
        #[arg(long)]
        content_type: Option<String>,

        /// Print the extracted items without storing them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the stored collection.
    List,

    /// Replace the text of one item.
    Update {
        /// Item id.
        id: u64,
        /// New text (may be empty).
        text: String,
    },

    /// Delete one item by id.
    Delete {
        /// Item id.
        id: u64,
    },

    /// Delete all items, keeping the collection's metadata.
    Clear,

    /// Export the collection.
    Export {
        /// `json` or `txt`.
        #[arg(long, default_value = "json")]
        format: ExportFormat,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Extract {
            path,
            content_type,
            dry_run,
        } => {
            ingest::run_extract(&cfg, &path, content_type.as_deref(), dry_run).await?;
        }
        Commands::List => {
            items::run_list(&cfg).await?;
        }
        Commands::Update { id, text } => {
            items::run_update(&cfg, id, text).await?;
        }
        Commands::Delete { id } => {
            items::run_delete(&cfg, id).await?;
        }
        Commands::Clear => {
            items::run_clear(&cfg).await?;
        }
        Commands::Export { format, output } => {
            export::run_export(&cfg, format, output.as_deref()).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
