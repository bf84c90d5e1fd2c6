use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "fofak.toml";
pub const DEFAULT_API_URL: &str = "https://fofa.info/api/v1/search/all";
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EXCLUDE_FILE: &str = "config/exclude_domain.xlsx";
pub const DEFAULT_OUTPUT_FILE: &str = "results.xlsx";

/// Runtime settings, read once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub email: String,
    pub key: String,
    pub api_url: String,
    pub page_size: u32,
    pub timeout_secs: u64,
    pub exclude_file: PathBuf,
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: String::new(),
            key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            exclude_file: PathBuf::from(DEFAULT_EXCLUDE_FILE),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl Config {
    /// Reads `path`, or `fofak.toml` in the working directory when no path is
    /// given. An explicit path must exist; a missing default file means
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_file, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !config_file.exists() {
            if explicit {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    config_file.display()
                )));
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_file)?;
        let config = Self::from_toml(&content).map_err(|e| {
            Error::Config(format!("{}: {}", config_file.display(), e))
        })?;

        info!(action = "load", component = "config", file_path = ?config_file, "Loaded configuration file");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Email and key for the search API; both must be non-blank.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let email = self.email.trim();
        let key = self.key.trim();
        if email.is_empty() || key.is_empty() {
            return Err(Error::Config(
                "FOFA email and API key are required (set FOFA_EMAIL/FOFA_KEY or edit fofak.toml)"
                    .to_string(),
            ));
        }
        Ok((email, key))
    }
}
