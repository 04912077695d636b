//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` and caches it.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use techdesk_core::config::ConfigRoot;
use techdesk_core::error::Result;

use crate::paths::TechdeskPaths;

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<ConfigRoot>>>,
}

impl ConfigService {
    pub fn new(paths: &TechdeskPaths) -> Self {
        Self::with_path(paths.config_file())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Reads config.toml. A missing file yields the defaults.
    pub fn load(&self) -> Result<ConfigRoot> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No config.toml, using defaults");
            return Ok(ConfigRoot::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// A malformed file is logged and replaced by the defaults.
    pub fn get_config(&self) -> ConfigRoot {
        if let Some(cached) = self
            .config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
        {
            return cached.clone();
        }

        let loaded = self.load().unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), "Ignoring unreadable config.toml: {}", e);
            ConfigRoot::default()
        });

        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(loaded.clone());

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use techdesk_core::config::AttachmentPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.load().unwrap(), ConfigRoot::default());
    }

    #[test]
    fn test_loads_and_caches() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[prompt]\nattachment_policy = \"first_turn_only\"\n").unwrap();
        let service = ConfigService::with_path(path.clone());

        let config = service.get_config();
        assert_eq!(config.prompt.attachment_policy, AttachmentPolicy::FirstTurnOnly);

        std::fs::write(&path, "").unwrap();
        assert_eq!(
            service.get_config().prompt.attachment_policy,
            AttachmentPolicy::FirstTurnOnly
        );

        service.invalidate_cache();
        assert_eq!(
            service.get_config().prompt.attachment_policy,
            AttachmentPolicy::EveryTurn
        );
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[model\nchat = ").unwrap();
        let service = ConfigService::with_path(path);

        assert!(service.load().unwrap_err().is_serialization());
        assert_eq!(service.get_config(), ConfigRoot::default());
    }
}
