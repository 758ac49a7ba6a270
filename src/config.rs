//! Runtime settings.
//!
//! Settings come from a TOML file; every field has a default so a missing or
//! partial file still yields a usable configuration.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::schema::SCHEMA_DOCUMENT_ID;

/// Errors raised while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the document store.
    pub store_path: PathBuf,
    /// Store identifier of the persisted schema document.
    pub schema_document_id: String,
    /// Seconds between schema ingest polls.
    pub ingest_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("data"),
            schema_document_id: SCHEMA_DOCUMENT_ID.to_string(),
            ingest_interval_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file. Missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&text)?;
        info!("loaded settings [path={}]", path.display());
        Ok(settings)
    }
}
