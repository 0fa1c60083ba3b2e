//! Application configuration management.
//!
//! Loads and saves the application-wide settings: where the hash index
//! lives, where backups land, and which extensions count as media. Values
//! from the config file are overridden by CLI flags; a missing or corrupt
//! file falls back to defaults.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Datelike;
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hash index database path. `None` resolves to the platform data dir.
    #[serde(default)]
    pub index_path: Option<PathBuf>,

    /// Backup destination root.
    #[serde(default = "default_destination")]
    pub destination: PathBuf,

    /// Backup subfolder under the destination root.
    /// `None` resolves to `Photos_<current year>`.
    #[serde(default)]
    pub backup_subfolder: Option<String>,

    /// Lowercase extensions (without the dot) that count as media.
    #[serde(default = "default_extensions")]
    pub extensions: HashSet<String>,

    /// Number of I/O threads for parallel hashing.
    #[serde(default)]
    pub io_threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_path: None,
            destination: default_destination(),
            backup_subfolder: None,
            extensions: default_extensions(),
            io_threads: None,
        }
    }
}

/// Extensions supported out of the box.
fn default_extensions() -> HashSet<String> {
    ["jpg", "jpeg", "png", "cr2", "nef", "mp4", "mov"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_destination() -> PathBuf {
    UserDirs::new()
        .map(|dirs| dirs.home_dir().join("Media_Backup"))
        .unwrap_or_else(|| PathBuf::from("Media_Backup"))
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    pub fn load() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration to the default platform-specific path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default platform-specific configuration path.
    fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "mediasift", "mediasift")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Resolve the hash index database path.
    ///
    /// Uses the configured override when present, otherwise `index.db` in
    /// the platform data dir.
    pub fn resolve_index_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.index_path {
            return Ok(path.clone());
        }

        let project_dirs = ProjectDirs::from("com", "mediasift", "mediasift")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.data_dir().join("index.db"))
    }

    /// The backup folder for this run: `destination/<subfolder>`.
    ///
    /// The subfolder defaults to `Photos_<current year>`.
    #[must_use]
    pub fn backup_folder(&self) -> PathBuf {
        let subfolder = self
            .backup_subfolder
            .clone()
            .unwrap_or_else(|| format!("Photos_{}", chrono::Local::now().year()));
        self.destination.join(subfolder)
    }
}
