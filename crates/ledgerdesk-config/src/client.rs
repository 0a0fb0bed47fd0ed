//! Client configuration: where the API lives and how sessions are kept.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ledgerdesk_client::{ClientBuilder, FileStorage, RefreshRotation, TokenStore};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Client Config
// ─────────────────────────────────────────────────────────────────────────────

/// Backend used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Environment variable that overrides `api-url`.
pub const API_URL_ENV: &str = "LEDGERDESK_API_URL";

/// Token file name inside the config directory.
const TOKEN_FILE: &str = "tokens.json";

/// Root client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Base URL of the backend API, including the version prefix.
    pub api_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Timeout for the token refresh call in seconds.
    pub refresh_timeout_secs: u64,

    /// Whether a refresh token returned on refresh replaces the stored one.
    pub refresh_rotation: RefreshRotation,

    /// Where tokens persist. Defaults to `tokens.json` next to the config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,

    /// Licenses expiring within this many days are flagged.
    pub license_warn_days: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            refresh_timeout_secs: 30,
            refresh_rotation: RefreshRotation::default(),
            token_file: None,
            license_warn_days: 30,
        }
    }
}

impl ClientConfig {
    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_api_url_override(std::env::var(API_URL_ENV).ok());
    }

    /// Replace `api_url` when an override is present and non-empty.
    pub fn apply_api_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url
            && !url.trim().is_empty()
        {
            tracing::debug!(api_url = %url, "API URL overridden");
            self.api_url = url;
        }
    }

    /// Resolved token file path.
    ///
    /// An explicit `token-file` wins (with `~/` expanded); otherwise the
    /// file sits in the config directory.
    pub fn token_file_path(&self) -> Option<PathBuf> {
        match &self.token_file {
            Some(path) => Some(expand_path(path)),
            None => crate::config_dir().map(|d| d.join(TOKEN_FILE)),
        }
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Refresh call timeout.
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    /// A client builder carrying these settings and a file-backed token store.
    pub fn client_builder(&self) -> Result<ClientBuilder> {
        let token_file = self.token_file_path().ok_or(ConfigError::NoConfigDir)?;

        Ok(ClientBuilder::new()
            .base_url(&self.api_url)
            .timeout(self.timeout())
            .refresh_timeout(self.refresh_timeout())
            .refresh_rotation(self.refresh_rotation)
            .token_store(TokenStore::new(FileStorage::new(token_file))))
    }

    fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api-url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.timeout_secs == 0 || self.refresh_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout-secs".to_string(),
                reason: "timeouts must be at least one second".to_string(),
            });
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading / Saving
// ─────────────────────────────────────────────────────────────────────────────

/// Load the client configuration with environment overrides applied.
///
/// Returns defaults if the file doesn't exist.
pub fn load_client_config() -> Result<ClientConfig> {
    let mut config = load_client_config_from(crate::config_path().as_deref())?;
    config.apply_env();
    Ok(config)
}

/// Load client config from a specific path, without environment overrides.
pub fn load_client_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig::default());
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(ClientConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    ClientConfig::from_toml(&contents)
}

/// Save the client configuration to the default location.
pub fn save_client_config(config: &ClientConfig) -> Result<PathBuf> {
    let path = crate::config_path().ok_or(ConfigError::NoConfigDir)?;
    save_client_config_to(config, &path)?;
    Ok(path)
}

/// Save client config to a specific path.
pub fn save_client_config_to(config: &ClientConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_toml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Expand ~ to home directory in paths.
fn expand_path(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/"))
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
