//! TOML configuration.
//!
//! ```toml
//! [storage]
//! data_dir = "./data"
//! file_name = "items.json"
//!
//! [server]
//! bind = "127.0.0.1:7340"
//!
//! [upload]
//! max_bytes = 10485760
//! accepted_types = ["application/pdf", "text/plain"]
//! ```
//!
//! Every section is optional; missing values fall back to the defaults above.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::extract;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: default_file_name(),
        }
    }
}

impl StorageConfig {
    /// Full path of the persisted collection.
    pub fn collection_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_file_name() -> String {
    "items.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    #[serde(default = "default_accepted_types")]
    pub accepted_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            accepted_types: default_accepted_types(),
        }
    }
}

impl UploadConfig {
    pub fn accepts(&self, content_type: &str) -> bool {
        self.accepted_types.iter().any(|t| t == content_type)
    }
}

fn default_max_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_accepted_types() -> Vec<String> {
    vec![
        extract::MIME_PDF.to_string(),
        extract::MIME_TEXT.to_string(),
        extract::MIME_MARKDOWN.to_string(),
        extract::MIME_DOCX.to_string(),
    ]
}

impl Config {
    /// Built-in configuration used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Loads `path` if it exists, otherwise returns [`Config::minimal`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    let file_name = config.storage.file_name.trim();
    if file_name.is_empty() {
        anyhow::bail!("storage.file_name must not be empty");
    }
    if file_name.contains(['/', '\\']) || file_name == "." || file_name == ".." {
        anyhow::bail!(
            "storage.file_name must be a bare file name, got '{}'",
            config.storage.file_name
        );
    }

    if config.upload.max_bytes == 0 {
        anyhow::bail!("upload.max_bytes must be > 0");
    }
    if config.upload.accepted_types.is_empty() {
        anyhow::bail!("upload.accepted_types must list at least one content type");
    }
    for t in &config.upload.accepted_types {
        if !extract::is_supported(t) {
            anyhow::bail!(
                "Unsupported upload content type: '{}'. Supported: {}",
                t,
                extract::SUPPORTED_TYPES.join(", ")
            );
        }
    }

    Ok(())
}
