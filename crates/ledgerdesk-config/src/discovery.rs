//! Config directory discovery.
//!
//! `LEDGERDESK_CONFIG_DIR` wins when set and non-empty; otherwise the
//! platform default (`~/.config/ledgerdesk` on Linux,
//! `~/Library/Application Support/ledgerdesk` on macOS).

use std::path::PathBuf;

/// Application name for config directory resolution.
const APP_NAME: &str = "ledgerdesk";

/// Config filename within the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Environment variable to override the config directory.
pub const CONFIG_DIR_ENV: &str = "LEDGERDESK_CONFIG_DIR";

/// The config directory for ledgerdesk.
pub fn config_dir() -> Option<PathBuf> {
    config_dir_from(std::env::var(CONFIG_DIR_ENV).ok())
}

/// Path of the config file inside [`config_dir`].
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

fn config_dir_from(env_value: Option<String>) -> Option<PathBuf> {
    if let Some(dir) = env_value
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
