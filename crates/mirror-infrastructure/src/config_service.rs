//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from the configuration file (~/.config/mirror/config.toml).

use crate::paths::MirrorPaths;
use mirror_core::config::MirrorConfig;
use mirror_core::{MirrorError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the root configuration.
///
/// A missing file yields the defaults; a present file must parse and
/// validate.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<MirrorConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService for the default config file location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(MirrorPaths::config_file()?))
    }

    /// Creates a ConfigService reading from `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<MirrorConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|e| MirrorError::internal(format!("config cache poisoned: {e}")))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = Self::load_config(&self.path)?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|e| MirrorError::internal(format!("config cache poisoned: {e}")))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_config(path: &Path) -> Result<MirrorConfig> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(MirrorConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: MirrorConfig = toml::from_str(&content).map_err(|e| {
            MirrorError::config(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        config.validate()?;

        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config().unwrap(), MirrorConfig::default());
    }

    #[test]
    fn test_loads_and_caches_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "model = \"gemini-test\"\nrequest_timeout_secs = 20\n").unwrap();

        let service = ConfigService::with_path(&path);
        let config = service.get_config().unwrap();
        assert_eq!(config.model, "gemini-test");
        assert_eq!(config.request_timeout_secs, Some(20));

        // cached until invalidated
        std::fs::write(&path, "model = \"other\"\n").unwrap();
        assert_eq!(service.get_config().unwrap().model, "gemini-test");
        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().model, "other");
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        std::fs::write(&path, "history_capacity = 0\n").unwrap();
        assert!(ConfigService::with_path(&path).get_config().unwrap_err().is_config());

        std::fs::write(&path, "history_capacity = \"many\"\n").unwrap();
        assert!(ConfigService::with_path(&path).get_config().unwrap_err().is_config());
    }
}
