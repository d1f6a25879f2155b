//! Configuration file handling for build-cli

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Path to the JSON key file
    pub api_key_file: Option<PathBuf>,
    /// Model used when a command's model argument is omitted
    pub model: Option<String>,
    /// Default output format
    pub output: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
    /// Override for the versioned API root
    pub api_url: Option<String>,
    /// Override for the host poll cursors resolve against
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Directory holding `config.toml` and the default key file
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join("build-cli"))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(
        &self,
        key_file: Option<&Path>,
        output: Option<&str>,
        no_color: bool,
    ) -> MergedConfig {
        MergedConfig {
            key_file: key_file
                .map(Path::to_path_buf)
                .or_else(|| self.api_key_file.clone())
                .or_else(|| Self::config_dir().ok().map(|dir| dir.join("key.json"))),
            model: self.model.clone(),
            output: output
                .map(String::from)
                .or_else(|| self.output.clone())
                .unwrap_or_else(|| "table".to_string()),
            no_color: no_color || self.no_color.unwrap_or(false),
            api_url: self.api_url.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub key_file: Option<PathBuf>,
    pub model: Option<String>,
    pub output: String,
    pub no_color: bool,
    pub api_url: Option<String>,
    pub base_url: Option<String>,
}

impl MergedConfig {
    /// Model to use when none was given on the command line
    pub fn model_or_default(&self, model: Option<&str>) -> Result<String> {
        match model.map(String::from).or_else(|| self.model.clone()) {
            Some(model) => Ok(model),
            None => bail!("No model given and no default model configured"),
        }
    }
}

/// On-disk key file: `{"key": "..."}`
#[derive(Debug, Deserialize)]
struct KeyFile {
    key: String,
}

/// Read the API key from a JSON key file
pub fn load_api_key(path: &Path) -> Result<String> {
    debug!("Reading API key from {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read key file: {}", path.display()))?;
    parse_api_key(&content).with_context(|| format!("Invalid key file: {}", path.display()))
}

fn parse_api_key(content: &str) -> Result<String> {
    let key_file: KeyFile = serde_json::from_str(content)?;
    if key_file.key.trim().is_empty() {
        bail!("key is empty");
    }
    Ok(key_file.key)
}
