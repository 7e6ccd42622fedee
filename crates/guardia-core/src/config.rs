use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the three catalog JSON resources live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL (`https://…`) or local directory holding `episodes-list.json`,
    /// `stats.json` and `config.json`.
    #[serde(default = "default_catalog_source")]
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON key-value file backing favourites, listened and filter state.
    #[serde(default = "default_prefs_file")]
    pub prefs_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_volume")]
    pub default_volume: f32,
    #[serde(default = "default_mpv_socket")]
    pub mpv_socket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: default_catalog_source(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefs_file: default_prefs_file(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            mpv_socket: default_mpv_socket(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

fn default_catalog_source() -> String {
    "https://enguardia.cat/data".to_string()
}

fn default_prefs_file() -> PathBuf {
    platform::data_dir().join("storage.json")
}

fn default_volume() -> f32 {
    1.0
}

fn default_mpv_socket() -> String {
    platform::mpv_socket_name()
}

fn default_search_debounce_ms() -> u64 {
    300
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`, writing the defaults there first if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.player.default_volume = config.player.default_volume.clamp(0.0, 1.0);
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
