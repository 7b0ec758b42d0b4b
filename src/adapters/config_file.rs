//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`]. A missing file yields
//! [`ServerConfig::default()`]; a file that exists but cannot be read or
//! parsed is an error so a typo never silently reverts to defaults.
//! Fields absent from the file keep their defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::ConfigPort;
use crate::config::ServerConfig;
use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct JsonFileConfig {
    path: PathBuf,
}

impl JsonFileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `config` as pretty JSON, e.g. to seed a fresh install.
    pub fn save(&self, config: &ServerConfig) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        fs::write(&self.path, text).map_err(|e| ConfigError::Io(e.to_string()))?;
        info!("Config written to {}", self.path.display());
        Ok(())
    }
}

impl ConfigPort for JsonFileConfig {
    fn load(&self) -> Result<ServerConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", self.path.display());
                return Ok(ServerConfig::default());
            }
            Err(e) => return Err(ConfigError::Io(format!("{}: {e}", self.path.display()))),
        };
        let config: ServerConfig = serde_json::from_str(&text)
            .map_err(|e| ConfigError::Corrupted(format!("{}: {e}", self.path.display())))?;
        info!("Loaded config from {}", self.path.display());
        Ok(config)
    }
}
