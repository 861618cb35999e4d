//! YAML-file configuration for the command-line interface.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// Upload options read from a YAML file.
///
/// Every field is optional. Values given on the command line take
/// precedence over the file, and anything left unset in both falls back
/// to the built-in defaults.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FileConfig {
    /// Key prefix prepended to every uploaded object
    #[serde(default)]
    pub destination_prefix: Option<String>,

    /// Number of concurrent upload workers
    #[serde(default)]
    pub workers: Option<usize>,

    /// Region for the destination bucket
    #[serde(default)]
    pub region: Option<String>,

    /// Make uploaded objects publicly readable
    #[serde(default)]
    pub public: Option<bool>,

    /// Use path-style bucket addressing
    #[serde(default)]
    pub path_style: Option<bool>,

    /// Regex applied to file basenames
    #[serde(default)]
    pub pattern: Option<String>,

    /// Compress files with gzip before uploading
    #[serde(default)]
    pub gzip: Option<bool>,

    /// Working directory for gzip staging
    #[serde(default)]
    pub gzip_working_dir: Option<PathBuf>,

    /// Metadata attached to every uploaded object
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl FileConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: FileConfig =
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
