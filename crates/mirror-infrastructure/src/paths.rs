//! Unified path management for mirror configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/mirror/            # Config directory (platform config dir + "mirror")
//! ├── config.toml              # Application configuration
//! ├── catalog.toml             # Optional catalog override
//! └── logs/                    # Application logs
//!     └── mirror.log.YYYY-MM-DD
//! ```

use mirror_core::{MirrorError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "mirror";

/// Unified path management for mirror.
pub struct MirrorPaths;

impl MirrorPaths {
    /// Returns the mirror configuration directory.
    ///
    /// # Errors
    ///
    /// Returns a config error when the platform config directory cannot be
    /// determined (no home directory).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| MirrorError::config("Cannot find home directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path where a catalog override is looked for by default.
    pub fn catalog_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("catalog.toml"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("logs"))
    }
}
