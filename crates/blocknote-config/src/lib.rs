use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// What the confirmation key does in the block editor.
///
/// `Split` divides the focused block in two (the full notes editor
/// behavior); `Passthrough` forwards confirmation to the host's generic
/// key handler (the dashboard's single-block editor behavior).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmSetting {
    #[default]
    Split,
    Passthrough,
}

/// Editor options the host application reads at startup.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Confirmation-key policy for the edit session.
    #[serde(default)]
    pub confirm: ConfirmSetting,
    /// Block kind of the single block a fresh document starts with, by its
    /// stable name ("paragraph", "h1", ...). Validated by the host against
    /// the engine's block type registry.
    #[serde(default = "default_initial_block")]
    pub initial_block: String,
}

fn default_initial_block() -> String {
    "paragraph".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confirm: ConfirmSetting::default(),
            initial_block: default_initial_block(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/blocknote");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }
}
