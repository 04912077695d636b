//! Unified path management for techdesk configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/techdesk/          # Config directory
//! ├── config.toml              # Model and prompt settings
//! ├── secret.json              # API keys
//! └── logs/                    # Application logs
//!     └── techdesk.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

use techdesk_core::config::{GeminiConfig, SecretConfig};
use techdesk_core::error::{Result, TechdeskError};

const APP_DIR: &str = "techdesk";

/// Resolves techdesk's files, either under the user's config directory or
/// under an explicit base directory (used by `--config-dir` and tests).
#[derive(Debug, Clone)]
pub struct TechdeskPaths {
    config_dir: PathBuf,
}

impl TechdeskPaths {
    /// Uses `base` when given, otherwise `~/.config/techdesk`.
    pub fn new(base: Option<&Path>) -> Result<Self> {
        let config_dir = match base {
            Some(base) => base.to_path_buf(),
            None => dirs::home_dir()
                .ok_or_else(|| TechdeskError::config("Cannot find home directory"))?
                .join(".config")
                .join(APP_DIR),
        };
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Path to secret.json.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600).
    pub fn secret_file(&self) -> PathBuf {
        self.config_dir.join("secret.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    /// Ensures the secret file exists, creating an empty template if it doesn't.
    ///
    /// The template is written with permissions 600 on Unix.
    pub fn ensure_secret_file(&self) -> Result<PathBuf> {
        let secret_path = self.secret_file();
        if secret_path.exists() {
            return Ok(secret_path);
        }

        std::fs::create_dir_all(&self.config_dir)?;

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: None,
            }),
        };
        std::fs::write(&secret_path, serde_json::to_string_pretty(&template)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        Ok(secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_dir() {
        let paths = TechdeskPaths::new(None).unwrap();
        assert!(paths.config_dir().ends_with("techdesk"));
        assert!(paths.config_file().starts_with(paths.config_dir()));
        assert!(paths.secret_file().ends_with("secret.json"));
        assert!(paths.logs_dir().ends_with("logs"));
    }

    #[test]
    fn test_ensure_secret_file_creates_template_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TechdeskPaths::new(Some(&temp_dir.path().join("nested"))).unwrap();

        let path = paths.ensure_secret_file().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: SecretConfig = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.gemini.unwrap().api_key, "");

        std::fs::write(&path, r#"{"gemini":{"api_key":"k"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"k\""));
    }
}
