// src/infrastructure/config.rs
use crate::constants::{
    APP_DIR, CONFIG_FILE, DEFAULT_AVATAR_BUCKET, DEFAULT_NOTES_TABLE, DEFAULT_NOTE_BUCKET,
    DEFAULT_PROFILES_TABLE, DEFAULT_TIMEOUT_SECS, ENV_ANON_KEY, ENV_BACKEND_URL, SESSION_FILE,
};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// TOML configuration for pnote
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub tables: TableConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TableConfig {
    #[serde(default = "default_notes_table")]
    pub notes: String,
    #[serde(default = "default_profiles_table")]
    pub profiles: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_note_bucket")]
    pub note_bucket: String,
    #[serde(default = "default_avatar_bucket")]
    pub avatar_bucket: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct SessionConfig {
    /// Empty means `<data_dir>/pnote/session.json`
    #[serde(default)]
    pub path: String,
}

fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }
fn default_notes_table() -> String { DEFAULT_NOTES_TABLE.to_string() }
fn default_profiles_table() -> String { DEFAULT_PROFILES_TABLE.to_string() }
fn default_note_bucket() -> String { DEFAULT_NOTE_BUCKET.to_string() }
fn default_avatar_bucket() -> String { DEFAULT_AVATAR_BUCKET.to_string() }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            notes: default_notes_table(),
            profiles: default_profiles_table(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            note_bucket: default_note_bucket(),
            avatar_bucket: default_avatar_bucket(),
        }
    }
}

impl Config {
    /// Platform default location of the config file
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults,
    /// then apply environment overrides.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            debug!(?path, "Loading config");
            Self::load(path)?
        } else {
            debug!(?path, "No config file, using defaults");
            Self::default()
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides looked up by environment variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.is_empty()) {
            self.backend.url = url;
        }
        if let Some(key) = lookup(ENV_ANON_KEY).filter(|v| !v.is_empty()) {
            self.backend.anon_key = key;
        }
        self
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }
        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Backend settings are required before any remote call.
    pub fn ensure_backend(&self) -> Result<()> {
        if self.backend.url.trim().is_empty() {
            bail!(
                "No backend URL configured. Set backend.url in the config file or {}",
                ENV_BACKEND_URL
            );
        }
        if self.backend.anon_key.trim().is_empty() {
            bail!(
                "No anon key configured. Set backend.anon_key in the config file or {}",
                ENV_ANON_KEY
            );
        }
        Ok(())
    }

    pub fn session_path(&self) -> Result<PathBuf> {
        if !self.session.path.is_empty() {
            return Ok(PathBuf::from(&self.session.path));
        }
        let dir = dirs::data_dir().context("Could not find data directory")?;
        Ok(dir.join(APP_DIR).join(SESSION_FILE))
    }
}
