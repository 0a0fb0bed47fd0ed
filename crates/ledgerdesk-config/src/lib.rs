//! Configuration for Ledgerdesk clients.
//!
//! A single TOML file in the user config directory:
//!
//! ```toml
//! api-url = "https://office.example/api/v1"
//! timeout-secs = 30
//! refresh-timeout-secs = 30
//! refresh-rotation = "accept-if-present"
//! token-file = "~/.config/ledgerdesk/tokens.json"
//! license-warn-days = 30
//! ```
//!
//! Every key is optional. `LEDGERDESK_API_URL` overrides `api-url`, and
//! `LEDGERDESK_CONFIG_DIR` moves the whole directory.

pub mod client;
pub mod discovery;
pub mod error;

pub use client::{
    ClientConfig, DEFAULT_API_URL, load_client_config, load_client_config_from,
    save_client_config, save_client_config_to,
};
pub use discovery::{config_dir, config_path};
pub use error::{ConfigError, Result};
