//! TOML config file under the user's config directory

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

const APP_DIR: &str = "voice-recorder";
const FILE_NAME: &str = "config.toml";
const HEADER: &str = "# voice-recorder settings. Edit with `voice-recorder config set <key> <value>`.\n\n";

/// `$XDG_CONFIG_HOME/voice-recorder/config.toml` (or the platform
/// equivalent from `dirs`)
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    pub fn new() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(std::env::temp_dir);
        Self::with_path(base.join(APP_DIR).join(FILE_NAME))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn decode(content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn encode(config: &AppConfig) -> Result<String, ConfigError> {
        let body = toml::to_string_pretty(config)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        Ok(format!("{}{}", HEADER, body))
    }

    /// Write through a sibling temp file so a crash never leaves half a file
    async fn write_atomically(path: &Path, content: String) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::WriteError(format!("{}: {}", path.display(), e));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let staging = path.with_extension("toml.tmp");
        fs::write(&staging, content).await.map_err(write_err)?;
        fs::rename(&staging, path).await.map_err(write_err)
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Self::decode(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No config file, using defaults");
                Ok(AppConfig::empty())
            }
            Err(e) => Err(ConfigError::ReadError(format!("{}: {}", self.path.display(), e))),
        }
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        Self::write_atomically(&self.path, Self::encode(config)?).await
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(self.path.display().to_string()));
        }
        self.save(&AppConfig::defaults()).await
    }
}
