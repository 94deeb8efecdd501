//! Configuration loaded from `~/.config/streamseek/config.toml`.
//!
//! Every section is optional; a missing file yields defaults. The metadata
//! API key may also come from the `TMDB_API_KEY` environment variable,
//! which takes precedence over the file.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::http_client::HttpOptions;
use crate::metadata::TmdbOptions;

/// Environment variable holding the metadata API key.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub metadata: MetadataConfig,
    pub http: HttpConfig,
    /// Per-adapter settings keyed by adapter ID.
    pub providers: BTreeMap<String, ProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        let tmdb = TmdbOptions::default();
        Self {
            api_key: tmdb.api_key,
            base_url: tmdb.base_url,
            language: tmdb.language,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Deadline for one provider's whole lookup when querying all of them.
    pub provider_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            provider_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub enabled: bool,
    /// Override for the site's base URL (mirrors move often).
    pub base_url: Option<String>,
    /// Audio language channels (SerienFans).
    pub languages: Vec<String>,
    /// Extra catalog ID → slug entries (SerienFans).
    pub slugs: HashMap<String, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            languages: Vec::new(),
            slugs: HashMap::new(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override the metadata API key; blank values are ignored.
    pub fn apply_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.metadata.api_key = Some(key);
        }
    }

    /// Settings for one adapter, defaults when the section is absent.
    pub fn provider(&self, id: &str) -> ProviderConfig {
        self.providers.get(id).cloned().unwrap_or_default()
    }

    pub fn tmdb_options(&self) -> TmdbOptions {
        TmdbOptions {
            api_key: self.metadata.api_key.clone(),
            base_url: self.metadata.base_url.clone(),
            language: self.metadata.language.clone(),
        }
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: Duration::from_secs(self.http.connect_timeout_secs),
            timeout: Duration::from_secs(self.http.timeout_secs),
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.http.provider_timeout_secs)
    }
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("streamseek")
        .join("config.toml")
}
