// SPDX-License-Identifier: AGPL-3.0-or-later
//! Engine configuration
//!
//! Read from `config.toml` in the platform config directory
//! (e.g. `~/.config/file-manager-kit/config.toml` on Linux). Every key is
//! optional; missing keys keep their defaults.

use crate::encoding::TextDecoder;
use crate::error::{FmkError, FmkResult};
use crate::state::DEFAULT_RECENT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 5 MiB
pub const DEFAULT_MAX_READ_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_SEARCH_LIMIT: usize = 100;
pub const DEFAULT_MAX_NAME_ATTEMPTS: u32 = 10_000;
pub const DEFAULT_FALLBACK_ENCODING: &str = "gbk";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial current directory; the process working directory when unset
    pub start_dir: Option<PathBuf>,
    /// Largest file `read_file` will load
    pub max_read_bytes: u64,
    /// Recent-file history size
    pub recent_capacity: usize,
    /// Maximum results per search
    pub search_limit: usize,
    /// Collision candidates tried before giving up on copy/move
    pub max_name_attempts: u32,
    /// Encoding tried when UTF-8 decoding fails
    pub fallback_encoding: String,
    /// Snapshot files before `write_file` overwrites them
    pub backup_on_write: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_dir: None,
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            search_limit: DEFAULT_SEARCH_LIMIT,
            max_name_attempts: DEFAULT_MAX_NAME_ATTEMPTS,
            fallback_encoding: DEFAULT_FALLBACK_ENCODING.to_string(),
            backup_on_write: true,
        }
    }
}

impl EngineConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "fmk", "file-manager-kit")
            .map(|d| d.config_dir().join("config.toml"))
    }

    pub fn from_toml(text: &str) -> FmkResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| FmkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> FmkResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_toml(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(FmkError::from_io(e, path)),
        }
    }

    /// Load from the default location, if there is one
    pub fn load_default() -> FmkResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> FmkResult<()> {
        if self.recent_capacity == 0 {
            return Err(FmkError::Config("recent_capacity must be at least 1".into()));
        }
        if self.search_limit == 0 {
            return Err(FmkError::Config("search_limit must be at least 1".into()));
        }
        TextDecoder::new(&self.fallback_encoding)?;
        Ok(())
    }

    pub fn decoder(&self) -> FmkResult<TextDecoder> {
        TextDecoder::new(&self.fallback_encoding)
    }
}
