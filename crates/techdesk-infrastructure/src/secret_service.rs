//! Secret service implementation.
//!
//! Reads API keys from secret.json, with environment variables taking
//! precedence so keys can be supplied without touching disk.

use std::path::PathBuf;
use std::sync::Arc;

use techdesk_core::config::{GeminiConfig, SecretConfig};
use techdesk_core::error::{Result, TechdeskError};
use techdesk_core::secret::SecretService;
use tokio::sync::RwLock;

use crate::paths::TechdeskPaths;

/// Environment variables checked, in order, for a Gemini API key.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Service for managing secret configuration.
///
/// The parsed file is cached after the first successful load.
#[derive(Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
    env_vars: Vec<&'static str>,
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    pub fn new(paths: &TechdeskPaths) -> Self {
        Self::with_path(paths.secret_file())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            env_vars: API_KEY_ENV_VARS.to_vec(),
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    /// Replaces the environment variables consulted before the file.
    pub fn with_env_vars(mut self, env_vars: Vec<&'static str>) -> Self {
        self.env_vars = env_vars;
        self
    }

    fn key_from_env(&self) -> Option<String> {
        self.env_vars
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
    }

    async fn read_file(&self) -> Result<SecretConfig> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            TechdeskError::config(format!(
                "Failed to read secret file at {}: {}",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            TechdeskError::config(format!(
                "Failed to parse secret file at {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn load_secrets_internal(&self) -> Result<SecretConfig> {
        if let Some(cached) = self.secrets.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let loaded = self.read_file().await?;
        *self.secrets.write().await = Some(loaded.clone());
        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        if let Some(api_key) = self.key_from_env() {
            tracing::debug!("Using Gemini API key from environment");
            let model_name = self
                .load_secrets_internal()
                .await
                .ok()
                .and_then(|config| config.gemini)
                .and_then(|gemini| gemini.model_name);
            return Ok(SecretConfig {
                gemini: Some(GeminiConfig {
                    api_key,
                    model_name,
                }),
            });
        }

        self.load_secrets_internal().await
    }

    async fn secret_file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}
